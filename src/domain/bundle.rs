//! The standard set of indicator series computed for one bar sequence.
//!
//! Bars are validated up front; after that each indicator is computed
//! independently and a failing one is recorded in `failures` rather than
//! aborting the rest. Callers that need every series use
//! [`IndicatorBundle::require_complete`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::error::{IndicatorError, StockwatchError, ValidationError};
use crate::domain::indicator::{
    IndicatorType, Series, calculate_bollinger, calculate_kdj, calculate_macd, calculate_obv,
    calculate_rsi, calculate_sma,
};
use crate::domain::ohlcv::{OhlcvBar, closes, validate_bars};
use crate::domain::signal::{RULE_MA_WINDOWS, RULE_RSI_PERIOD};

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ma_windows: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_periods: Vec<usize>,
    pub kdj_window: usize,
    pub kdj_d_smooth: usize,
    pub kdj_j_smooth: usize,
    pub boll_window: usize,
    pub boll_k: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            ma_windows: vec![5, 10, 20, 60],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_periods: vec![6, 14],
            kdj_window: 9,
            kdj_d_smooth: 3,
            kdj_j_smooth: 3,
            boll_window: 20,
            boll_k: 2.0,
        }
    }
}

impl IndicatorConfig {
    /// Require the windows the fixed signal rules read. Without them the MA
    /// and RSI6 rules could never fire.
    pub fn check_rule_operands(&self) -> Result<(), ValidationError> {
        if let Some(window) = RULE_MA_WINDOWS.iter().find(|&&w| !self.ma_windows.contains(&w)) {
            return Err(ValidationError::InvalidParameter {
                name: "ma_windows",
                reason: format!("must include {} for the MA signal rules", window),
            });
        }
        if !self.rsi_periods.contains(&RULE_RSI_PERIOD) {
            return Err(ValidationError::InvalidParameter {
                name: "rsi_periods",
                reason: format!("must include {} for the RSI signal rule", RULE_RSI_PERIOD),
            });
        }
        Ok(())
    }
}

/// Key of a series inside a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SeriesName {
    Ma(usize),
    MacdLine,
    MacdSignal,
    MacdHist,
    Rsi(usize),
    K,
    D,
    J,
    BollUpper,
    BollMiddle,
    BollLower,
    Obv,
}

impl fmt::Display for SeriesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesName::Ma(window) => write!(f, "ma{}", window),
            SeriesName::MacdLine => write!(f, "macd_line"),
            SeriesName::MacdSignal => write!(f, "macd_signal"),
            SeriesName::MacdHist => write!(f, "macd_hist"),
            SeriesName::Rsi(period) => write!(f, "rsi{}", period),
            SeriesName::K => write!(f, "k"),
            SeriesName::D => write!(f, "d"),
            SeriesName::J => write!(f, "j"),
            SeriesName::BollUpper => write!(f, "boll_upper"),
            SeriesName::BollMiddle => write!(f, "boll_mid"),
            SeriesName::BollLower => write!(f, "boll_lower"),
            SeriesName::Obv => write!(f, "obv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFailure {
    pub indicator: IndicatorType,
    pub error: IndicatorError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBundle {
    dates: Vec<NaiveDate>,
    series: BTreeMap<SeriesName, Series>,
    failures: Vec<IndicatorFailure>,
}

impl IndicatorBundle {
    pub fn compute(bars: &[OhlcvBar], config: &IndicatorConfig) -> Result<Self, ValidationError> {
        validate_bars(bars)?;
        let closes = closes(bars);
        let mut bundle = IndicatorBundle {
            dates: bars.iter().map(|b| b.date).collect(),
            series: BTreeMap::new(),
            failures: Vec::new(),
        };

        for &window in &config.ma_windows {
            let result = calculate_sma(&closes, window);
            bundle.absorb(IndicatorType::Sma(window), result, |s| {
                vec![(SeriesName::Ma(window), s)]
            });
        }

        let macd = calculate_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
        bundle.absorb(
            IndicatorType::Macd {
                fast: config.macd_fast,
                slow: config.macd_slow,
                signal: config.macd_signal,
            },
            macd,
            |m| {
                vec![
                    (SeriesName::MacdLine, m.line),
                    (SeriesName::MacdSignal, m.signal),
                    (SeriesName::MacdHist, m.histogram),
                ]
            },
        );

        for &period in &config.rsi_periods {
            let result = calculate_rsi(&closes, period);
            bundle.absorb(IndicatorType::Rsi(period), result, |s| {
                vec![(SeriesName::Rsi(period), s)]
            });
        }

        let kdj = calculate_kdj(
            bars,
            config.kdj_window,
            config.kdj_d_smooth,
            config.kdj_j_smooth,
        );
        bundle.absorb(
            IndicatorType::Kdj {
                k_window: config.kdj_window,
                d_smooth: config.kdj_d_smooth,
                j_smooth: config.kdj_j_smooth,
            },
            kdj,
            |k| vec![(SeriesName::K, k.k), (SeriesName::D, k.d), (SeriesName::J, k.j)],
        );

        let boll = calculate_bollinger(&closes, config.boll_window, config.boll_k);
        bundle.absorb(
            IndicatorType::bollinger(config.boll_window, config.boll_k),
            boll,
            |b| {
                vec![
                    (SeriesName::BollUpper, b.upper),
                    (SeriesName::BollMiddle, b.middle),
                    (SeriesName::BollLower, b.lower),
                ]
            },
        );

        let obv = calculate_obv(bars);
        bundle.absorb(IndicatorType::Obv, obv, |s| vec![(SeriesName::Obv, s)]);

        Ok(bundle)
    }

    fn absorb<T>(
        &mut self,
        indicator: IndicatorType,
        result: Result<T, IndicatorError>,
        split: impl FnOnce(T) -> Vec<(SeriesName, Series)>,
    ) {
        match result {
            Ok(value) => self.series.extend(split(value)),
            Err(error) => {
                warn!(%indicator, %error, "indicator failed");
                self.failures.push(IndicatorFailure { indicator, error });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn get(&self, name: SeriesName) -> Option<&Series> {
        self.series.get(&name)
    }

    /// Value of `name` at `index`; `None` when the series is missing, failed
    /// or not yet available.
    pub fn value(&self, name: SeriesName, index: usize) -> Option<f64> {
        self.get(name).and_then(|s| s.get(index))
    }

    pub fn names(&self) -> impl Iterator<Item = SeriesName> + '_ {
        self.series.keys().copied()
    }

    /// Last value of every series in key order.
    pub fn latest_values(&self) -> Vec<(SeriesName, Option<f64>)> {
        self.series.iter().map(|(name, s)| (*name, s.last())).collect()
    }

    pub fn failures(&self) -> &[IndicatorFailure] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Abort on the first failed indicator.
    pub fn require_complete(self) -> Result<Self, StockwatchError> {
        match self.failures.first() {
            Some(failure) => Err(StockwatchError::Indicator {
                indicator: failure.indicator,
                source: failure.error.clone(),
            }),
            None => Ok(self),
        }
    }
}
