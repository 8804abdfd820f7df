//! Named strategy profiles and their composite-score thresholds.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategyProfile {
    #[default]
    Conservative,
    Moderate,
    Aggressive,
}

impl StrategyProfile {
    pub const ALL: [StrategyProfile; 3] = [
        StrategyProfile::Conservative,
        StrategyProfile::Moderate,
        StrategyProfile::Aggressive,
    ];

    /// Composite score needed to buy.
    pub fn buy_threshold(self) -> f64 {
        match self {
            StrategyProfile::Conservative => 0.6,
            StrategyProfile::Moderate => 0.4,
            StrategyProfile::Aggressive => 0.2,
        }
    }

    /// Composite score needed to sell.
    pub fn sell_threshold(self) -> f64 {
        -self.buy_threshold()
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyProfile::Conservative => "conservative",
            StrategyProfile::Moderate => "moderate",
            StrategyProfile::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for StrategyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyProfile {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StrategyProfile::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}
