//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) values are not available.

use crate::domain::error::{IndicatorError, ValidationError};
use crate::domain::indicator::stddev::window_stats;
use crate::domain::indicator::{
    IndicatorType, Series, ensure_finite, require_len, require_period, validate_values,
};

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn calculate_bollinger(
    values: &[f64],
    window: usize,
    multiplier: f64,
) -> Result<BollingerBands, IndicatorError> {
    let indicator = IndicatorType::bollinger(window, multiplier);
    validate_values(values, "bollinger input")?;
    require_period("window", window)?;
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Err(ValidationError::InvalidParameter {
            name: "k",
            reason: format!("band multiplier must be positive, got {}", multiplier),
        }
        .into());
    }
    require_len(indicator, values.len(), window)?;

    let mut upper = Vec::with_capacity(values.len());
    let mut middle = Vec::with_capacity(values.len());
    let mut lower = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if i + 1 < window {
            upper.push(None);
            middle.push(None);
            lower.push(None);
            continue;
        }
        let (mean, stddev) = window_stats(&values[i + 1 - window..=i]);
        let half_width = multiplier * stddev;
        upper.push(Some(mean + half_width));
        middle.push(Some(mean));
        lower.push(Some(mean - half_width));
    }

    let bands = BollingerBands {
        upper: Series::new(upper),
        middle: Series::new(middle),
        lower: Series::new(lower),
    };
    ensure_finite(&bands.upper, indicator)?;
    ensure_finite(&bands.lower, indicator)?;
    Ok(bands)
}
