//! Signal generation.
//!
//! Two independent outputs are derived from an [`IndicatorBundle`]:
//! - discrete [`SignalEvent`]s fired by fixed rules at a bar (`rules`)
//! - a bounded composite score and a per-bar [`TradeSignal`] under a
//!   [`StrategyProfile`] (`composite`)
//!
//! [`IndicatorBundle`]: crate::domain::bundle::IndicatorBundle
//! [`StrategyProfile`]: crate::domain::strategy::StrategyProfile

pub mod composite;
pub mod rules;

pub use composite::{CompositeConfig, CompositeRow, composite_scores, generate_trading_signals};
pub use rules::{RULE_MA_WINDOWS, RULE_RSI_PERIOD, detect_latest, detect_signals};

use std::fmt;

use chrono::NaiveDate;

use crate::domain::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("buy"),
            Direction::Sell => f.write_str("sell"),
        }
    }
}

/// The fixed detection rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SignalRule {
    Ma5Ma10Cross,
    Ma5Ma20Cross,
    MacdCross,
    KdjExtreme,
    KdjCross,
    Rsi6Extreme,
    BollingerTouch,
    MaStacking,
}

impl SignalRule {
    pub const ALL: [SignalRule; 8] = [
        SignalRule::Ma5Ma10Cross,
        SignalRule::Ma5Ma20Cross,
        SignalRule::MacdCross,
        SignalRule::KdjExtreme,
        SignalRule::KdjCross,
        SignalRule::Rsi6Extreme,
        SignalRule::BollingerTouch,
        SignalRule::MaStacking,
    ];

    pub fn strength(self) -> u8 {
        match self {
            SignalRule::Ma5Ma10Cross => 6,
            SignalRule::Ma5Ma20Cross => 7,
            SignalRule::MacdCross => 7,
            SignalRule::KdjExtreme => 5,
            SignalRule::KdjCross => 7,
            SignalRule::Rsi6Extreme => 6,
            SignalRule::BollingerTouch => 5,
            SignalRule::MaStacking => 8,
        }
    }

    /// Stable event name for this rule firing in `direction`.
    pub fn event_name(self, direction: Direction) -> &'static str {
        use Direction::{Buy, Sell};
        match (self, direction) {
            (SignalRule::Ma5Ma10Cross, Buy) => "MA5/10 golden cross",
            (SignalRule::Ma5Ma10Cross, Sell) => "MA5/10 death cross",
            (SignalRule::Ma5Ma20Cross, Buy) => "MA5/20 golden cross",
            (SignalRule::Ma5Ma20Cross, Sell) => "MA5/20 death cross",
            (SignalRule::MacdCross, Buy) => "MACD golden cross",
            (SignalRule::MacdCross, Sell) => "MACD death cross",
            (SignalRule::KdjExtreme, Buy) => "KDJ oversold",
            (SignalRule::KdjExtreme, Sell) => "KDJ overbought",
            (SignalRule::KdjCross, Buy) => "KDJ low golden cross",
            (SignalRule::KdjCross, Sell) => "KDJ high death cross",
            (SignalRule::Rsi6Extreme, Buy) => "RSI6 oversold",
            (SignalRule::Rsi6Extreme, Sell) => "RSI6 overbought",
            (SignalRule::BollingerTouch, Buy) => "Bollinger lower touch",
            (SignalRule::BollingerTouch, Sell) => "Bollinger upper touch",
            (SignalRule::MaStacking, Buy) => "MA bullish alignment",
            (SignalRule::MaStacking, Sell) => "MA bearish alignment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SignalEvent {
    pub name: &'static str,
    pub rule: SignalRule,
    pub direction: Direction,
    /// Fixed per-rule weight, 1 to 10.
    pub strength: u8,
    pub bar_index: usize,
}

impl SignalEvent {
    pub fn new(rule: SignalRule, direction: Direction, bar_index: usize) -> Self {
        SignalEvent {
            name: rule.event_name(direction),
            rule,
            direction,
            strength: rule.strength(),
            bar_index,
        }
    }
}

/// Discrete per-bar trading decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(i8)]
pub enum TradeSignal {
    Sell = -1,
    #[default]
    Hold = 0,
    Buy = 1,
}

impl TradeSignal {
    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

impl TryFrom<i8> for TradeSignal {
    type Error = ValidationError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(TradeSignal::Sell),
            0 => Ok(TradeSignal::Hold),
            1 => Ok(TradeSignal::Buy),
            other => Err(ValidationError::InvalidParameter {
                name: "signal",
                reason: format!("expected -1, 0 or 1, got {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub signal: TradeSignal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_strengths() {
        let strengths: Vec<u8> = SignalRule::ALL.iter().map(|r| r.strength()).collect();
        assert_eq!(strengths, vec![6, 7, 7, 5, 7, 6, 5, 8]);
        assert!(strengths.iter().all(|s| (1..=10).contains(s)));
    }

    #[test]
    fn event_names_unique() {
        let mut names: Vec<&str> = SignalRule::ALL
            .iter()
            .flat_map(|r| [r.event_name(Direction::Buy), r.event_name(Direction::Sell)])
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn event_carries_rule_strength() {
        let event = SignalEvent::new(SignalRule::MacdCross, Direction::Buy, 42);
        assert_eq!(event.name, "MACD golden cross");
        assert_eq!(event.strength, 7);
        assert_eq!(event.bar_index, 42);
    }

    #[test]
    fn trade_signal_codes() {
        assert_eq!(TradeSignal::Sell.as_i8(), -1);
        assert_eq!(TradeSignal::Hold.as_i8(), 0);
        assert_eq!(TradeSignal::Buy.as_i8(), 1);
        assert_eq!(TradeSignal::try_from(1), Ok(TradeSignal::Buy));
        assert!(TradeSignal::try_from(2).is_err());
    }
}
