//! KDJ stochastic oscillator.
//!
//! RSV = (C - LLV(L, n)) / (HHV(H, n) - LLV(L, n)) * 100, or 50 when HHV == LLV
//! %K = (1 - 1/m1) * %K_prev + (1/m1) * RSV
//! %D = (1 - 1/m2) * %D_prev + (1/m2) * %K
//! %J = 3 * %K - 2 * %D
//!
//! %K and %D are seeded at 50 and the recurrence runs from the first bar,
//! with the look-back window truncated at the start of the series.
//! Default parameters: n=9, m1=3, m2=3.
//! Warmup: first (n-1) values are reported not available.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    IndicatorType, Series, ensure_finite, require_len, require_period, validate_values,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_K_WINDOW: usize = 9;
pub const DEFAULT_D_SMOOTH: usize = 3;
pub const DEFAULT_J_SMOOTH: usize = 3;

const SEED: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Kdj {
    pub k: Series,
    pub d: Series,
    pub j: Series,
}

/// %K/%D accumulator, advanced one RSV at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdjState {
    pub k: f64,
    pub d: f64,
    k_weight: f64,
    d_weight: f64,
}

impl KdjState {
    pub fn new(d_smooth: usize, j_smooth: usize) -> Self {
        KdjState {
            k: SEED,
            d: SEED,
            k_weight: 1.0 / d_smooth as f64,
            d_weight: 1.0 / j_smooth as f64,
        }
    }

    /// Fold one RSV value in, returning the new state and `(k, d, j)`.
    pub fn step(self, rsv: f64) -> (Self, (f64, f64, f64)) {
        let k = (1.0 - self.k_weight) * self.k + self.k_weight * rsv;
        let d = (1.0 - self.d_weight) * self.d + self.d_weight * k;
        let j = 3.0 * k - 2.0 * d;
        (KdjState { k, d, ..self }, (k, d, j))
    }
}

/// Raw stochastic value for `bars[i]` over the truncated trailing window.
fn rsv(bars: &[OhlcvBar], i: usize, window: usize) -> f64 {
    let start = (i + 1).saturating_sub(window);
    let slice = &bars[start..=i];
    let highest = slice.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let lowest = slice.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    if highest == lowest {
        SEED
    } else {
        (bars[i].close - lowest) / (highest - lowest) * 100.0
    }
}

pub fn calculate_kdj(
    bars: &[OhlcvBar],
    k_window: usize,
    d_smooth: usize,
    j_smooth: usize,
) -> Result<Kdj, IndicatorError> {
    let indicator = IndicatorType::Kdj {
        k_window,
        d_smooth,
        j_smooth,
    };
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    validate_values(&highs, "kdj highs")?;
    validate_values(&lows, "kdj lows")?;
    validate_values(&closes, "kdj closes")?;
    require_period("k_window", k_window)?;
    require_period("d_smooth", d_smooth)?;
    require_period("j_smooth", j_smooth)?;
    require_len(indicator, bars.len(), k_window)?;

    let warmup = k_window - 1;
    let (k, (d, j)): (Vec<_>, (Vec<_>, Vec<_>)) = (0..bars.len())
        .map(|i| rsv(bars, i, k_window))
        .scan(KdjState::new(d_smooth, j_smooth), |state, rsv| {
            let (next, kdj) = state.step(rsv);
            *state = next;
            Some(kdj)
        })
        .enumerate()
        .map(|(i, (k, d, j))| {
            if i < warmup {
                (None, (None, None))
            } else {
                (Some(k), (Some(d), Some(j)))
            }
        })
        .unzip();

    let kdj = Kdj {
        k: Series::new(k),
        d: Series::new(d),
        j: Series::new(j),
    };
    ensure_finite(&kdj.k, indicator)?;
    ensure_finite(&kdj.d, indicator)?;
    ensure_finite(&kdj.j, indicator)?;
    Ok(kdj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(rows: &[(f64, f64, f64)]) -> Vec<OhlcvBar> {
        rows.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| {
                OhlcvBar::new(
                    NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                    close,
                    high,
                    low,
                    close,
                    1000,
                )
            })
            .collect()
    }

    #[test]
    fn kdj_state_seeded_at_50() {
        let state = KdjState::new(3, 3);
        assert_eq!(state.k, 50.0);
        assert_eq!(state.d, 50.0);
    }

    #[test]
    fn kdj_state_step_recurrence() {
        let (state, (k, d, j)) = KdjState::new(3, 3).step(80.0);
        // k = 2/3*50 + 1/3*80 = 60, d = 2/3*50 + 1/3*60 = 53.33..
        assert!((k - 60.0).abs() < 1e-12);
        assert!((d - (100.0 / 3.0 + 20.0)).abs() < 1e-12);
        assert!((j - (3.0 * k - 2.0 * d)).abs() < 1e-12);
        assert_eq!(state.k, k);
        assert_eq!(state.d, d);
    }

    #[test]
    fn kdj_flat_window_rsv_is_50() {
        let bars = make_bars(&[(10.0, 10.0, 10.0); 5]);
        let kdj = calculate_kdj(&bars, 3, 3, 3).unwrap();
        for i in 2..5 {
            assert!((kdj.k.get(i).unwrap() - 50.0).abs() < 1e-12);
            assert!((kdj.d.get(i).unwrap() - 50.0).abs() < 1e-12);
            assert!((kdj.j.get(i).unwrap() - 50.0).abs() < 1e-12);
        }
    }

    #[test]
    fn kdj_warmup() {
        let bars = make_bars(&[(11.0, 9.0, 10.0); 12]);
        let kdj = calculate_kdj(&bars, 9, 3, 3).unwrap();
        for i in 0..8 {
            assert_eq!(kdj.k.get(i), None);
            assert_eq!(kdj.j.get(i), None);
        }
        assert!(kdj.k.get(8).is_some());
    }

    #[test]
    fn kdj_recurrence_starts_at_first_bar() {
        // close at the high every bar => RSV = 100 from bar 0
        let bars = make_bars(&[(12.0, 8.0, 12.0), (13.0, 9.0, 13.0), (14.0, 10.0, 14.0)]);
        let kdj = calculate_kdj(&bars, 2, 3, 3).unwrap();

        let mut state = KdjState::new(3, 3);
        let mut last = (0.0, 0.0, 0.0);
        for _ in 0..3 {
            let (next, out) = state.step(100.0);
            state = next;
            last = out;
        }
        assert!((kdj.k.get(2).unwrap() - last.0).abs() < 1e-12);
        assert!((kdj.d.get(2).unwrap() - last.1).abs() < 1e-12);
    }

    #[test]
    fn kdj_rsv_uses_window_extremes() {
        let bars = make_bars(&[(20.0, 10.0, 15.0), (18.0, 12.0, 12.0)]);
        // bar 1 window: high 20, low 10, close 12 => 20
        assert!((rsv(&bars, 1, 2) - 20.0).abs() < 1e-12);
        // window of one bar only looks at bar 1
        assert!(rsv(&bars, 1, 1).abs() < 1e-12);
    }

    #[test]
    fn kdj_insufficient_data() {
        let bars = make_bars(&[(11.0, 9.0, 10.0); 4]);
        assert!(calculate_kdj(&bars, 9, 3, 3).is_err());
    }

    #[test]
    fn kdj_zero_smoothing_rejected() {
        let bars = make_bars(&[(11.0, 9.0, 10.0); 10]);
        assert!(calculate_kdj(&bars, 9, 0, 3).is_err());
        assert!(calculate_kdj(&bars, 9, 3, 0).is_err());
    }

    #[test]
    fn kdj_empty_input() {
        assert!(calculate_kdj(&[], 9, 3, 3).is_err());
    }
}
