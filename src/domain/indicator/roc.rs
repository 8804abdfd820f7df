//! ROC (Rate of Change) indicator.
//!
//! ROC(n)[i] = ((S[i] - S[i-n]) / S[i-n]) * 100
//!
//! Works on a partially defined series (e.g. a moving average): a value is
//! available only when both endpoints are available and S[i-n] != 0.

use crate::domain::error::{IndicatorError, ValidationError};
use crate::domain::indicator::{IndicatorType, Series, ensure_finite, require_len, require_period};

pub fn calculate_roc(series: &Series, period: usize) -> Result<Series, IndicatorError> {
    let indicator = IndicatorType::Roc(period);
    if series.is_empty() {
        return Err(ValidationError::EmptyInput { what: "roc input" }.into());
    }
    if let Some(index) = series.iter().position(|v| v.is_some_and(|x| !x.is_finite())) {
        return Err(ValidationError::NonFinite {
            what: "roc input",
            index,
        }
        .into());
    }
    require_period("period", period)?;
    require_len(indicator, series.len(), period + 1)?;

    let roc: Series = (0..series.len())
        .map(|i| {
            let prev = series.get(i.checked_sub(period)?)?;
            let curr = series.get(i)?;
            (prev != 0.0).then(|| (curr - prev) / prev * 100.0)
        })
        .collect();

    ensure_finite(&roc, indicator)?;
    Ok(roc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(values: &[f64]) -> Series {
        values.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn roc_warmup() {
        let series = calculate_roc(&full(&[100.0, 105.0, 110.0, 115.0, 120.0]), 3).unwrap();
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(2), None);
        assert!(series.get(3).is_some());
        assert!(series.get(4).is_some());
    }

    #[test]
    fn roc_basic_calculation() {
        let series = calculate_roc(&full(&[100.0, 105.0, 110.0, 115.0]), 2).unwrap();
        let expected = ((110.0 - 100.0) / 100.0) * 100.0;
        assert!((series.get(2).unwrap() - expected).abs() < f64::EPSILON);
        let expected = ((115.0 - 105.0) / 105.0) * 100.0;
        assert!((series.get(3).unwrap() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn roc_zero_base_not_available() {
        let series = calculate_roc(&full(&[0.0, 100.0, 110.0]), 2).unwrap();
        assert_eq!(series.get(2), None);
    }

    #[test]
    fn roc_negative_change() {
        let v = calculate_roc(&full(&[100.0, 90.0, 80.0]), 2)
            .unwrap()
            .get(2)
            .unwrap();
        assert!((v + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn roc_follows_input_availability() {
        let input = Series::new(vec![None, None, Some(10.0), Some(11.0)]);
        let series = calculate_roc(&input, 1).unwrap();
        assert_eq!(series.get(2), None);
        assert!((series.get(3).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn roc_insufficient_data() {
        assert!(calculate_roc(&full(&[100.0, 105.0]), 10).is_err());
    }
}
