//! Signal reliability scanner.
//!
//! Replays rule detection over a whole history and measures what happened
//! `h` bars after every firing. A buy firing wins when the forward return
//! is positive, a sell firing when it is negative.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::bundle::{IndicatorBundle, IndicatorConfig};
use crate::domain::error::ValidationError;
use crate::domain::ohlcv::{OhlcvBar, closes};
use crate::domain::signal::{Direction, SignalEvent, SignalRule, detect_signals};

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    /// First bar index evaluated.
    pub warmup: usize,
    pub min_bars: usize,
    pub horizons: Vec<usize>,
    /// Firings needed before a signal can be named best.
    pub min_triggers: usize,
    /// Horizon used for best-signal selection, scoring and ranking.
    pub ranking_horizon: usize,
    /// Keep only signal names containing this substring.
    pub signal_filter: Option<String>,
    pub indicators: IndicatorConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            warmup: 30,
            min_bars: 50,
            horizons: vec![1, 3, 5, 10, 20],
            min_triggers: 3,
            ranking_horizon: 5,
            signal_filter: None,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.horizons.is_empty() {
            return Err(ValidationError::EmptyInput { what: "horizons" });
        }
        if self.horizons.contains(&0) {
            return Err(ValidationError::InvalidParameter {
                name: "horizons",
                reason: "horizons must be positive".into(),
            });
        }
        if !self.horizons.contains(&self.ranking_horizon) {
            return Err(ValidationError::InvalidParameter {
                name: "ranking_horizon",
                reason: format!(
                    "{} is not one of the horizons {:?}",
                    self.ranking_horizon, self.horizons
                ),
            });
        }
        self.indicators.check_rule_operands()?;
        if self.min_bars <= self.warmup {
            return Err(ValidationError::InvalidParameter {
                name: "min_bars",
                reason: format!(
                    "must exceed warmup ({}), got {}",
                    self.warmup, self.min_bars
                ),
            });
        }
        Ok(())
    }

    fn accepts(&self, name: &str) -> bool {
        self.signal_filter
            .as_deref()
            .is_none_or(|filter| name.contains(filter))
    }
}

/// Outcome statistics of one signal at one horizon.
///
/// All figures are 0 when no firing had `h` bars of future data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HorizonStats {
    pub horizon: usize,
    pub wins: usize,
    pub total: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub max_return: f64,
    pub min_return: f64,
}

impl HorizonStats {
    fn from_returns(horizon: usize, direction: Direction, returns: &[f64]) -> Self {
        if returns.is_empty() {
            return HorizonStats {
                horizon,
                wins: 0,
                total: 0,
                win_rate: 0.0,
                avg_return: 0.0,
                max_return: 0.0,
                min_return: 0.0,
            };
        }
        let wins = returns
            .iter()
            .filter(|&&r| match direction {
                Direction::Buy => r > 0.0,
                Direction::Sell => r < 0.0,
            })
            .count();
        let total = returns.len();
        HorizonStats {
            horizon,
            wins,
            total,
            win_rate: wins as f64 / total as f64,
            avg_return: returns.iter().sum::<f64>() / total as f64,
            max_return: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_return: returns.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SignalReliability {
    pub name: &'static str,
    pub rule: SignalRule,
    pub direction: Direction,
    pub triggers: usize,
    pub trigger_indices: Vec<usize>,
    pub horizons: Vec<HorizonStats>,
}

impl SignalReliability {
    pub fn at_horizon(&self, horizon: usize) -> Option<&HorizonStats> {
        self.horizons.iter().find(|s| s.horizon == horizon)
    }

    /// Win rate at `horizon`, 0 when the horizon was not tabulated.
    pub fn win_rate(&self, horizon: usize) -> f64 {
        self.at_horizon(horizon).map_or(0.0, |s| s.win_rate)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReliabilityReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bars: usize,
    pub ranking_horizon: usize,
    /// Keyed by signal name.
    pub signals: BTreeMap<&'static str, SignalReliability>,
    pub best_buy: Option<&'static str>,
    pub best_sell: Option<&'static str>,
    /// 0 to 10.
    pub overall_score: f64,
}

impl ReliabilityReport {
    pub fn signal(&self, name: &str) -> Option<&SignalReliability> {
        self.signals.get(name)
    }

    pub fn total_firings(&self) -> usize {
        self.signals.values().map(|s| s.triggers).sum()
    }

    /// Signals by ranking-horizon win rate, then trigger count, both
    /// descending. Equal entries stay in name order.
    pub fn ranked(&self) -> Vec<&SignalReliability> {
        let h = self.ranking_horizon;
        let mut ranked: Vec<&SignalReliability> = self.signals.values().collect();
        ranked.sort_by(|a, b| {
            b.win_rate(h)
                .total_cmp(&a.win_rate(h))
                .then(b.triggers.cmp(&a.triggers))
        });
        ranked
    }
}

/// Group firings by signal name and measure forward returns at each
/// horizon. Horizons running past the last close are skipped.
///
/// `closes` must be positive; [`scan`] guarantees this through bar validation.
pub fn tabulate(
    closes: &[f64],
    firings: &[SignalEvent],
    horizons: &[usize],
) -> BTreeMap<&'static str, SignalReliability> {
    let mut grouped: BTreeMap<&'static str, (SignalRule, Direction, Vec<usize>)> = BTreeMap::new();
    for event in firings {
        grouped
            .entry(event.name)
            .or_insert_with(|| (event.rule, event.direction, Vec::new()))
            .2
            .push(event.bar_index);
    }

    grouped
        .into_iter()
        .map(|(name, (rule, direction, indices))| {
            let horizons = horizons
                .iter()
                .map(|&h| {
                    let returns: Vec<f64> = indices
                        .iter()
                        .filter_map(|&i| {
                            let entry = *closes.get(i)?;
                            let exit = *closes.get(i + h)?;
                            Some((exit - entry) / entry)
                        })
                        .collect();
                    HorizonStats::from_returns(h, direction, &returns)
                })
                .collect();
            let reliability = SignalReliability {
                name,
                rule,
                direction,
                triggers: indices.len(),
                trigger_indices: indices,
                horizons,
            };
            (name, reliability)
        })
        .collect()
}

/// Highest win rate at `horizon` among signals with enough triggers.
/// Ties keep the signal that sorts first by name, not the one that fired first.
fn best_of(
    signals: &BTreeMap<&'static str, SignalReliability>,
    direction: Direction,
    horizon: usize,
    min_triggers: usize,
) -> Option<&'static str> {
    let mut best = None;
    let mut best_rate = 0.0;
    for s in signals.values() {
        if s.direction != direction || s.triggers < min_triggers {
            continue;
        }
        let rate = s.win_rate(horizon);
        if rate > best_rate {
            best_rate = rate;
            best = Some(s.name);
        }
    }
    best
}

fn overall_score(
    signals: &BTreeMap<&'static str, SignalReliability>,
    horizon: usize,
    bars: usize,
) -> f64 {
    let resolved: Vec<f64> = signals
        .values()
        .filter_map(|s| s.at_horizon(horizon))
        .filter(|stats| stats.total > 0)
        .map(|stats| stats.win_rate)
        .collect();
    let avg_win_rate = if resolved.is_empty() {
        0.0
    } else {
        resolved.iter().sum::<f64>() / resolved.len() as f64
    };
    let firings: usize = signals.values().map(|s| s.triggers).sum();
    let density = firings as f64 / bars as f64;
    (avg_win_rate * 10.0 + density * 50.0).min(10.0)
}

/// Scan `bars` from `config.warmup` onward.
///
/// The bundle is computed once over the full series; every indicator is
/// causal, so the values at index `i` equal those computed on `bars[..=i]`.
pub fn scan(bars: &[OhlcvBar], config: &ScannerConfig) -> Result<ReliabilityReport, ValidationError> {
    config.validate()?;
    if bars.len() < config.min_bars {
        return Err(ValidationError::InsufficientData {
            what: "signal scan".into(),
            have: bars.len(),
            need: config.min_bars,
        });
    }
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(ValidationError::EmptyInput { what: "bars" });
    };
    let bundle = IndicatorBundle::compute(bars, &config.indicators)?;

    let mut firings = Vec::new();
    for index in config.warmup..bars.len() {
        let events = detect_signals(bars, &bundle, index)?;
        firings.extend(events.into_iter().filter(|e| config.accepts(e.name)));
    }
    debug!(firings = firings.len(), "detection pass complete");

    let signals = tabulate(&closes(bars), &firings, &config.horizons);
    let h = config.ranking_horizon;
    let report = ReliabilityReport {
        start_date: first.date,
        end_date: last.date,
        bars: bars.len(),
        ranking_horizon: h,
        best_buy: best_of(&signals, Direction::Buy, h, config.min_triggers),
        best_sell: best_of(&signals, Direction::Sell, h, config.min_triggers),
        overall_score: overall_score(&signals, h, bars.len()),
        signals,
    };

    info!(
        bars = report.bars,
        distinct = report.signals.len(),
        firings = report.total_firings(),
        best_buy = report.best_buy.unwrap_or("-"),
        best_sell = report.best_sell.unwrap_or("-"),
        score = report.overall_score,
        "signal scan complete"
    );
    Ok(report)
}
