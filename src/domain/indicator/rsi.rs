//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / max(avg_loss, 1e-10)))
//!
//! Warmup: first n values are not available (n price changes are needed).

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    IndicatorType, Series, ensure_finite, require_len, require_period, validate_values,
};

/// Floor applied to the average loss so RS stays finite.
pub const LOSS_EPSILON: f64 = 1e-10;

/// Wilder accumulator over successive price changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiState {
    period: usize,
    seen: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl RsiState {
    pub fn new(period: usize) -> Self {
        RsiState {
            period,
            seen: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    /// Fold one price change into the averages.
    ///
    /// Returns the RSI once `period` changes have been seen.
    pub fn step(self, change: f64) -> (Self, Option<f64>) {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let n = self.period as f64;
        let seen = self.seen + 1;

        let (avg_gain, avg_loss) = if seen <= self.period {
            // running sums until the seed average is complete
            let g = self.avg_gain + gain;
            let l = self.avg_loss + loss;
            if seen == self.period {
                (g / n, l / n)
            } else {
                (g, l)
            }
        } else {
            (
                (self.avg_gain * (n - 1.0) + gain) / n,
                (self.avg_loss * (n - 1.0) + loss) / n,
            )
        };

        let next = RsiState {
            period: self.period,
            seen,
            avg_gain,
            avg_loss,
        };
        let rsi = (seen >= self.period).then(|| rsi_from_averages(avg_gain, avg_loss));
        (next, rsi)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / avg_loss.max(LOSS_EPSILON);
    100.0 - 100.0 / (1.0 + rs)
}

pub fn calculate_rsi(values: &[f64], period: usize) -> Result<Series, IndicatorError> {
    let indicator = IndicatorType::Rsi(period);
    validate_values(values, "rsi input")?;
    require_period("period", period)?;
    require_len(indicator, values.len(), period + 1)?;

    let series: Series = std::iter::once(None)
        .chain(
            values
                .windows(2)
                .map(|w| w[1] - w[0])
                .scan(RsiState::new(period), |state, change| {
                    let (next, rsi) = state.step(change);
                    *state = next;
                    Some(rsi)
                }),
        )
        .collect();

    ensure_finite(&series, indicator)?;
    Ok(series)
}
