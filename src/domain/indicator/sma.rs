//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i])
//! Warmup: first (n-1) values are not available.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    IndicatorType, Series, ensure_finite, require_len, require_period, validate_values,
};

pub fn calculate_sma(values: &[f64], window: usize) -> Result<Series, IndicatorError> {
    let indicator = IndicatorType::Sma(window);
    validate_values(values, "sma input")?;
    require_period("window", window)?;
    require_len(indicator, values.len(), window)?;

    let series: Series = (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = values[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect();

    ensure_finite(&series, indicator)?;
    Ok(series)
}
