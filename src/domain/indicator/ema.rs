//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the first value, then EMA[i] = EMA[i-1]*(1-k) + C[i]*k.
//! Warmup: the recurrence starts at index 0 but the first (n-1) values are
//! reported as not available.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    IndicatorType, Series, ensure_finite, require_len, require_period, validate_values,
};

pub fn calculate_ema(values: &[f64], window: usize) -> Result<Series, IndicatorError> {
    let indicator = IndicatorType::Ema(window);
    validate_values(values, "ema input")?;
    require_period("window", window)?;
    require_len(indicator, values.len(), window)?;

    let series = Series::with_warmup(ema_recurrence(values, window), window - 1);
    ensure_finite(&series, indicator)?;
    Ok(series)
}

/// Raw EMA recurrence seeded with `values[0]`, defined at every index.
///
/// Callers are expected to have validated `values` and `window`.
pub fn ema_recurrence(values: &[f64], window: usize) -> Vec<f64> {
    let k = 2.0 / (window as f64 + 1.0);
    let mut iter = values.iter();
    let Some(&seed) = iter.next() else {
        return Vec::new();
    };

    std::iter::once(seed)
        .chain(iter.scan(seed, |prev, &current| {
            *prev = *prev * (1.0 - k) + current * k;
            Some(*prev)
        }))
        .collect()
}
