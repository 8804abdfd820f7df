//! Domain error types.
//!
//! Validation failures are raised before any computation starts; numeric
//! failures that slip past validation surface as [`ComputationError`].

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorType;

/// Malformed or insufficient input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{what} is empty")]
    EmptyInput { what: &'static str },

    #[error("insufficient data for {what}: have {have} values, need {need}")]
    InsufficientData {
        what: String,
        have: usize,
        need: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("non-finite value in {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },

    #[error("length mismatch: {left} has {left_len} values, {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("invalid bar on {date}: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },

    #[error("bar dates not strictly increasing at {date}")]
    UnorderedDates { date: NaiveDate },

    #[error("no overlapping dates between bars and signals")]
    NoOverlap,

    #[error("unknown strategy {name:?} (expected conservative, moderate or aggressive)")]
    UnknownStrategy { name: String },

    #[error("bar index {index} out of range for {len} bars")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Unexpected numeric failure not already guarded by validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("computation failed in {context}: {reason}")]
pub struct ComputationError {
    pub context: String,
    pub reason: String,
}

/// Error returned by the indicator functions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

/// Top-level error type for stockwatch.
#[derive(Debug, thiserror::Error)]
pub enum StockwatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error("indicator {indicator} failed: {source}")]
    Indicator {
        indicator: IndicatorType,
        #[source]
        source: IndicatorError,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error(transparent)]
    Watchlist(#[from] crate::domain::watchlist::WatchlistError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<IndicatorError> for StockwatchError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::Validation(e) => StockwatchError::Validation(e),
            IndicatorError::Computation(e) => StockwatchError::Computation(e),
        }
    }
}

impl StockwatchError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockwatchError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by the
    /// environment (I/O, data source).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StockwatchError::Validation(_)
                | StockwatchError::Indicator {
                    source: IndicatorError::Validation(_),
                    ..
                }
                | StockwatchError::ConfigMissing { .. }
                | StockwatchError::ConfigInvalid { .. }
        )
    }
}
