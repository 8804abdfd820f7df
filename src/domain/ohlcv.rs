//! OHLCV bar representation and input validation.

use chrono::NaiveDate;

use crate::domain::error::ValidationError;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: i64) -> Self {
        OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check `low <= {open, close} <= high`, finite prices, a positive
    /// close and `volume >= 0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(self.invalid(format!("{name} is not finite")));
            }
        }
        if self.close <= 0.0 {
            return Err(self.invalid(format!("close {} is not positive", self.close)));
        }
        if self.volume < 0 {
            return Err(self.invalid(format!("negative volume {}", self.volume)));
        }
        if self.low > self.high {
            return Err(self.invalid(format!("low {} above high {}", self.low, self.high)));
        }
        for (name, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Err(self.invalid(format!(
                    "{name} {value} outside [{}, {}]",
                    self.low, self.high
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> ValidationError {
        ValidationError::InvalidBar {
            date: self.date,
            reason,
        }
    }
}

/// Validate every bar and require strictly increasing dates.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), ValidationError> {
    if bars.is_empty() {
        return Err(ValidationError::EmptyInput { what: "bars" });
    }
    for (i, bar) in bars.iter().enumerate() {
        bar.validate()?;
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(ValidationError::UnorderedDates { date: bar.date });
        }
    }
    Ok(())
}

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn valid_bar_passes() {
        assert!(sample_bar().validate().is_ok());
    }

    #[test]
    fn negative_volume_rejected() {
        let bar = OhlcvBar {
            volume: -1,
            ..sample_bar()
        };
        assert!(matches!(
            bar.validate(),
            Err(ValidationError::InvalidBar { .. })
        ));
    }

    #[test]
    fn close_above_high_rejected() {
        let bar = OhlcvBar {
            close: 111.0,
            ..sample_bar()
        };
        let err = bar.validate().unwrap_err();
        assert!(err.to_string().contains("close 111 outside"));
    }

    #[test]
    fn open_below_low_rejected() {
        let bar = OhlcvBar {
            open: 89.0,
            ..sample_bar()
        };
        assert!(bar.validate().is_err());
    }

    #[test]
    fn low_above_high_rejected() {
        let bar = OhlcvBar {
            low: 120.0,
            ..sample_bar()
        };
        assert!(bar.validate().is_err());
    }

    #[test]
    fn nan_price_rejected() {
        let bar = OhlcvBar {
            close: f64::NAN,
            ..sample_bar()
        };
        let err = bar.validate().unwrap_err();
        assert!(err.to_string().contains("close is not finite"));
    }

    #[test]
    fn zero_close_rejected() {
        let bar = OhlcvBar {
            open: 0.5,
            high: 1.0,
            low: 0.0,
            close: 0.0,
            ..sample_bar()
        };
        let err = bar.validate().unwrap_err();
        assert!(err.to_string().contains("close 0 is not positive"));
    }

    #[test]
    fn unordered_dates_rejected() {
        let first = sample_bar();
        let second = OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            ..sample_bar()
        };
        assert_eq!(
            validate_bars(&[first, second]),
            Err(ValidationError::UnorderedDates {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
            })
        );
    }

    #[test]
    fn empty_bars_rejected() {
        assert_eq!(
            validate_bars(&[]),
            Err(ValidationError::EmptyInput { what: "bars" })
        );
    }

    #[test]
    fn gaps_between_dates_allowed() {
        let first = sample_bar();
        let second = OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 22).unwrap(),
            ..sample_bar()
        };
        assert!(validate_bars(&[first, second]).is_ok());
    }

    #[test]
    fn closes_extracts_close_column() {
        let bars = vec![
            sample_bar(),
            OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
                close: 100.0,
                ..sample_bar()
            },
        ];
        assert_eq!(closes(&bars), vec![105.0, 100.0]);
    }
}
