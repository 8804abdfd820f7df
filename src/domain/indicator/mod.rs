//! Technical indicator implementations.
//!
//! This module provides the shared types for indicator output:
//! - `Series`: values aligned 1:1 with a bar sequence, `None` during warm-up
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key
//!   and as the name reported when an indicator fails)
//!
//! Every `calculate_*` function validates its input before computing and
//! returns a series of the same length as the input.

pub mod bollinger;
pub mod ema;
pub mod kdj;
pub mod macd;
pub mod obv;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{BollingerBands, calculate_bollinger};
pub use ema::{calculate_ema, ema_recurrence};
pub use kdj::{Kdj, KdjState, calculate_kdj};
pub use macd::{Macd, calculate_macd, calculate_macd_default};
pub use obv::calculate_obv;
pub use roc::calculate_roc;
pub use rsi::{RsiState, calculate_rsi};
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use std::fmt;

use crate::domain::error::{ComputationError, IndicatorError, ValidationError};

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Series {
    values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Series { values }
    }

    /// Wrap raw values, marking the first `warmup` entries not available.
    pub fn with_warmup(raw: Vec<f64>, warmup: usize) -> Self {
        raw.into_iter()
            .enumerate()
            .map(|(i, v)| if i < warmup { None } else { Some(v) })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, `None` when out of range or not available.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }

    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl FromIterator<Option<f64>> for Series {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Series {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Roc(usize),
    Obv,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        /// `f64::to_bits` of the multiplier, so invalid values print as given.
        multiplier_bits: u64,
    },
    Kdj {
        k_window: usize,
        d_smooth: usize,
        j_smooth: usize,
    },
}

impl IndicatorType {
    pub fn bollinger(period: usize, k: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            multiplier_bits: k.to_bits(),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                multiplier_bits,
            } => write!(f, "BOLLINGER({},{})", period, f64::from_bits(*multiplier_bits)),
            IndicatorType::Kdj {
                k_window,
                d_smooth,
                j_smooth,
            } => write!(f, "KDJ({},{},{})", k_window, d_smooth, j_smooth),
        }
    }
}

/// Reject empty input and non-finite values.
pub(crate) fn validate_values(values: &[f64], what: &'static str) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::EmptyInput { what });
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ValidationError::NonFinite { what, index }),
        None => Ok(()),
    }
}

pub(crate) fn require_period(name: &'static str, period: usize) -> Result<(), ValidationError> {
    if period == 0 {
        return Err(ValidationError::InvalidParameter {
            name,
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

pub(crate) fn require_len(
    indicator: IndicatorType,
    have: usize,
    need: usize,
) -> Result<(), ValidationError> {
    if have < need {
        return Err(ValidationError::InsufficientData {
            what: indicator.to_string(),
            have,
            need,
        });
    }
    Ok(())
}

/// Finite input must give finite output; anything else is a numeric failure.
pub(crate) fn ensure_finite(series: &Series, indicator: IndicatorType) -> Result<(), IndicatorError> {
    match series.iter().position(|v| v.is_some_and(|x| !x.is_finite())) {
        Some(index) => Err(ComputationError {
            context: indicator.to_string(),
            reason: format!("non-finite result at index {}", index),
        }
        .into()),
        None => Ok(()),
    }
}
