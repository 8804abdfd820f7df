//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: all three lines become available at index slow-1.

use crate::domain::error::{IndicatorError, ValidationError};
use crate::domain::indicator::{
    IndicatorType, Series, ema_recurrence, ensure_finite, require_len, require_period,
    validate_values,
};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Macd {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn calculate_macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<Macd, IndicatorError> {
    let indicator = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    validate_values(values, "macd input")?;
    require_period("fast", fast)?;
    require_period("slow", slow)?;
    require_period("signal", signal_period)?;
    if fast >= slow {
        return Err(ValidationError::InvalidParameter {
            name: "fast",
            reason: format!("fast period {} must be less than slow period {}", fast, slow),
        }
        .into());
    }
    require_len(indicator, values.len(), slow.max(signal_period))?;

    let ema_fast = ema_recurrence(values, fast);
    let ema_slow = ema_recurrence(values, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_recurrence(&line, signal_period);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    let warmup = slow - 1;
    let macd = Macd {
        line: Series::with_warmup(line, warmup),
        signal: Series::with_warmup(signal, warmup),
        histogram: Series::with_warmup(histogram, warmup),
    };
    ensure_finite(&macd.line, indicator)?;
    ensure_finite(&macd.signal, indicator)?;
    Ok(macd)
}

pub fn calculate_macd_default(values: &[f64]) -> Result<Macd, IndicatorError> {
    calculate_macd(values, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_default() {
        let macd = calculate_macd_default(&ramp(40)).unwrap();
        for i in 0..DEFAULT_SLOW - 1 {
            assert_eq!(macd.line.get(i), None, "index {} should not be available", i);
            assert_eq!(macd.signal.get(i), None);
        }
        assert!(macd.line.get(DEFAULT_SLOW - 1).is_some());
        assert!(macd.histogram.get(DEFAULT_SLOW - 1).is_some());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let macd = calculate_macd_default(&ramp(60)).unwrap();
        for i in 0..60 {
            if let (Some(line), Some(signal), Some(hist)) =
                (macd.line.get(i), macd.signal.get(i), macd.histogram.get(i))
            {
                assert_eq!(hist, line - signal);
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        let macd = calculate_macd(&values, 3, 5, 2).unwrap();
        let fast = ema_recurrence(&values, 3);
        let slow = ema_recurrence(&values, 5);
        for i in 4..values.len() {
            assert!((macd.line.get(i).unwrap() - (fast[i] - slow[i])).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let macd = calculate_macd_default(&ramp(60)).unwrap();
        assert!(macd.line.last().unwrap() > 0.0);
    }

    #[test]
    fn macd_fast_not_less_than_slow_rejected() {
        let err = calculate_macd(&ramp(40), 26, 26, 9).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Validation(ValidationError::InvalidParameter { name: "fast", .. })
        ));
        assert!(calculate_macd(&ramp(40), 30, 26, 9).is_err());
    }

    #[test]
    fn macd_zero_period_rejected() {
        assert!(calculate_macd(&ramp(40), 0, 26, 9).is_err());
        assert!(calculate_macd(&ramp(40), 12, 26, 0).is_err());
    }

    #[test]
    fn macd_insufficient_data() {
        let err = calculate_macd_default(&ramp(20)).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::Validation(ValidationError::InsufficientData {
                what: "MACD(12,26,9)".into(),
                have: 20,
                need: 26,
            })
        );
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }
}
