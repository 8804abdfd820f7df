//! OBV (On-Balance Volume) indicator implementation.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{IndicatorType, Series, ensure_finite, require_len, validate_values};
use crate::domain::ohlcv::OhlcvBar;

/// Calculate OBV (On-Balance Volume) indicator.
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; every value is available. Needs at least two bars.
pub fn calculate_obv(bars: &[OhlcvBar]) -> Result<Series, IndicatorError> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    validate_values(&closes, "obv closes")?;
    require_len(IndicatorType::Obv, bars.len(), 2)?;

    let first = bars[0].volume as f64;
    let series: Series = std::iter::once(Some(first))
        .chain(bars.windows(2).scan(first, |obv, pair| {
            let (prev, bar) = (&pair[0], &pair[1]);
            if bar.close > prev.close {
                *obv += bar.volume as f64;
            } else if bar.close < prev.close {
                *obv -= bar.volume as f64;
            }
            Some(Some(*obv))
        }))
        .collect();

    ensure_finite(&series, IndicatorType::Obv)?;
    Ok(series)
}
