//! Latest-bar analysis of one symbol.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::bundle::{IndicatorBundle, IndicatorConfig, IndicatorFailure, SeriesName};
use crate::domain::error::{StockwatchError, ValidationError};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{
    CompositeConfig, CompositeRow, Direction, SignalEvent, TradeSignal, composite_scores,
    detect_latest,
};
use crate::domain::strategy::StrategyProfile;

/// Enough history for MA(60) to exist on the last bar.
pub const MIN_ANALYSIS_BARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    pub indicators: IndicatorConfig,
    pub composite: CompositeConfig,
    pub strategy: StrategyProfile,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnalysisReport {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
    pub bars: usize,
    /// Last value of every bundle series, in key order.
    pub indicators: Vec<(SeriesName, Option<f64>)>,
    pub signals: Vec<SignalEvent>,
    pub composite: CompositeRow,
    pub strategy: StrategyProfile,
    pub decision: TradeSignal,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub failures: Vec<IndicatorFailure>,
}

impl AnalysisReport {
    pub fn indicator(&self, name: SeriesName) -> Option<f64> {
        self.indicators
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| *v)
    }

    pub fn signals_in(&self, direction: Direction) -> impl Iterator<Item = &SignalEvent> {
        self.signals.iter().filter(move |s| s.direction == direction)
    }

    /// Sum of buy strengths minus sum of sell strengths.
    pub fn net_strength(&self) -> i32 {
        self.signals
            .iter()
            .map(|s| match s.direction {
                Direction::Buy => i32::from(s.strength),
                Direction::Sell => -i32::from(s.strength),
            })
            .sum()
    }
}

pub fn analyze(bars: &[OhlcvBar], config: &AnalysisConfig) -> Result<AnalysisReport, StockwatchError> {
    let Some(last) = bars.last() else {
        return Err(ValidationError::EmptyInput { what: "bars" }.into());
    };
    if bars.len() < MIN_ANALYSIS_BARS {
        return Err(ValidationError::InsufficientData {
            what: "analysis".into(),
            have: bars.len(),
            need: MIN_ANALYSIS_BARS,
        }
        .into());
    }
    config.indicators.check_rule_operands()?;

    let bundle = IndicatorBundle::compute(bars, &config.indicators)?;
    let signals = detect_latest(bars, &bundle)?;
    let rows = composite_scores(bars, &config.composite)?;
    let composite = rows.last().copied().ok_or(ValidationError::EmptyInput {
        what: "composite scores",
    })?;
    let decision = composite.decide(config.strategy);

    debug!(
        date = %last.date,
        signals = signals.len(),
        composite = ?composite.composite,
        decision = decision.as_i8(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        date: last.date,
        close: last.close,
        volume: last.volume,
        bars: bars.len(),
        indicators: bundle.latest_values(),
        signals,
        composite,
        strategy: config.strategy,
        decision,
        failures: bundle.failures().to_vec(),
    })
}
