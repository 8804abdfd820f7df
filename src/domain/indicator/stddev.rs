//! Standard Deviation indicator.
//!
//! Population standard deviation over n values.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) values are not available.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    IndicatorType, Series, ensure_finite, require_len, require_period, validate_values,
};

pub fn calculate_stddev(values: &[f64], window: usize) -> Result<Series, IndicatorError> {
    let indicator = IndicatorType::Stddev(window);
    validate_values(values, "stddev input")?;
    require_period("window", window)?;
    require_len(indicator, values.len(), window)?;

    let series: Series = (0..values.len())
        .map(|i| (i + 1 >= window).then(|| window_stats(&values[i + 1 - window..=i]).1))
        .collect();

    ensure_finite(&series, indicator)?;
    Ok(series)
}

/// Mean and population standard deviation of a non-empty window.
pub(crate) fn window_stats(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_warmup() {
        let series = calculate_stddev(&[10.0, 20.0, 30.0, 40.0], 3).unwrap();
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), None);
        assert!(series.get(2).is_some());
    }

    #[test]
    fn stddev_constant_values() {
        let series = calculate_stddev(&[100.0; 5], 3).unwrap();
        for v in series.iter().flatten() {
            assert!(v.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn stddev_is_population() {
        // [2,4,4,4,5,5,7,9]: mean 5, population variance 4
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let series = calculate_stddev(&values, 8).unwrap();
        assert!((series.get(7).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stddev_rolling_window() {
        let series = calculate_stddev(&[1.0, 1.0, 1.0, 3.0], 2).unwrap();
        assert!(series.get(2).unwrap().abs() < 1e-12);
        assert!((series.get(3).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stddev_insufficient_data() {
        assert!(calculate_stddev(&[1.0], 2).is_err());
    }
}
