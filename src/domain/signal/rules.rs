//! Per-bar signal detection.
//!
//! The same evaluation backs live analysis (last bar) and historical scans
//! (any index). Every rule reads only values at `index` and `index - 1`, so
//! the result at an index never depends on later bars.

use crate::domain::bundle::{IndicatorBundle, SeriesName};
use crate::domain::error::ValidationError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{Direction, SignalEvent, SignalRule};

/// Moving-average windows the MA cross and stacking rules read.
pub const RULE_MA_WINDOWS: [usize; 3] = [5, 10, 20];
/// RSI period the overbought/oversold rule reads.
pub const RULE_RSI_PERIOD: usize = 6;

const MA5: SeriesName = SeriesName::Ma(RULE_MA_WINDOWS[0]);
const MA10: SeriesName = SeriesName::Ma(RULE_MA_WINDOWS[1]);
const MA20: SeriesName = SeriesName::Ma(RULE_MA_WINDOWS[2]);
const RSI6: SeriesName = SeriesName::Rsi(RULE_RSI_PERIOD);

const KDJ_OVERSOLD: f64 = 20.0;
const KDJ_OVERBOUGHT: f64 = 80.0;
const KDJ_MIDLINE: f64 = 50.0;
const RSI6_OVERSOLD: f64 = 20.0;
const RSI6_OVERBOUGHT: f64 = 80.0;

struct BarView<'a> {
    bundle: &'a IndicatorBundle,
    close: f64,
    index: usize,
}

impl BarView<'_> {
    fn at(&self, name: SeriesName) -> Option<f64> {
        self.bundle.value(name, self.index)
    }

    /// Golden (Buy) or death (Sell) cross of `fast` over `slow` between the
    /// previous bar and this one. Needs all four values.
    fn cross(&self, fast: SeriesName, slow: SeriesName) -> Option<Direction> {
        let prev_index = self.index.checked_sub(1)?;
        let prev = self.bundle.value(fast, prev_index)? - self.bundle.value(slow, prev_index)?;
        let now = self.at(fast)? - self.at(slow)?;
        if prev <= 0.0 && now > 0.0 {
            Some(Direction::Buy)
        } else if prev >= 0.0 && now < 0.0 {
            Some(Direction::Sell)
        } else {
            None
        }
    }

    fn evaluate(&self, rule: SignalRule) -> Option<Direction> {
        match rule {
            SignalRule::Ma5Ma10Cross => self.cross(MA5, MA10),
            SignalRule::Ma5Ma20Cross => self.cross(MA5, MA20),
            SignalRule::MacdCross => self.cross(SeriesName::MacdLine, SeriesName::MacdSignal),
            SignalRule::KdjExtreme => {
                let (k, d) = (self.at(SeriesName::K)?, self.at(SeriesName::D)?);
                if k < KDJ_OVERSOLD && d < KDJ_OVERSOLD {
                    Some(Direction::Buy)
                } else if k > KDJ_OVERBOUGHT && d > KDJ_OVERBOUGHT {
                    Some(Direction::Sell)
                } else {
                    None
                }
            }
            SignalRule::KdjCross => {
                let k = self.at(SeriesName::K)?;
                match self.cross(SeriesName::K, SeriesName::D)? {
                    Direction::Buy if k < KDJ_MIDLINE => Some(Direction::Buy),
                    Direction::Sell if k > KDJ_MIDLINE => Some(Direction::Sell),
                    _ => None,
                }
            }
            SignalRule::Rsi6Extreme => {
                let rsi = self.at(RSI6)?;
                if rsi < RSI6_OVERSOLD {
                    Some(Direction::Buy)
                } else if rsi > RSI6_OVERBOUGHT {
                    Some(Direction::Sell)
                } else {
                    None
                }
            }
            SignalRule::BollingerTouch => {
                let lower = self.at(SeriesName::BollLower);
                let upper = self.at(SeriesName::BollUpper);
                if lower.is_some_and(|l| self.close <= l) {
                    Some(Direction::Buy)
                } else if upper.is_some_and(|u| self.close >= u) {
                    Some(Direction::Sell)
                } else {
                    None
                }
            }
            SignalRule::MaStacking => {
                let ma5 = self.at(MA5)?;
                let ma10 = self.at(MA10)?;
                let ma20 = self.at(MA20)?;
                if ma5 > ma10 && ma10 > ma20 {
                    Some(Direction::Buy)
                } else if ma5 < ma10 && ma10 < ma20 {
                    Some(Direction::Sell)
                } else {
                    None
                }
            }
        }
    }
}

/// All signal events firing at `index`.
///
/// A rule whose operands are not available at `index` (or `index - 1` for
/// crosses) does not fire. Events from different rules are independent and
/// may point in opposite directions.
pub fn detect_signals(
    bars: &[OhlcvBar],
    bundle: &IndicatorBundle,
    index: usize,
) -> Result<Vec<SignalEvent>, ValidationError> {
    if bars.len() != bundle.len() {
        return Err(ValidationError::LengthMismatch {
            left: "bars",
            left_len: bars.len(),
            right: "indicator bundle",
            right_len: bundle.len(),
        });
    }
    let bar = bars.get(index).ok_or(ValidationError::IndexOutOfRange {
        index,
        len: bars.len(),
    })?;

    let view = BarView {
        bundle,
        close: bar.close,
        index,
    };
    Ok(SignalRule::ALL
        .into_iter()
        .filter_map(|rule| {
            view.evaluate(rule)
                .map(|direction| SignalEvent::new(rule, direction, index))
        })
        .collect())
}

/// Signal events at the most recent bar.
pub fn detect_latest(
    bars: &[OhlcvBar],
    bundle: &IndicatorBundle,
) -> Result<Vec<SignalEvent>, ValidationError> {
    let last = bars
        .len()
        .checked_sub(1)
        .ok_or(ValidationError::EmptyInput { what: "bars" })?;
    detect_signals(bars, bundle, last)
}
