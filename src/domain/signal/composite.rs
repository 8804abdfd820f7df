//! Composite scoring and strategy-thresholded trading signals.
//!
//! Five terms, each in [-1, 1], are averaged into one score per bar:
//! MA cross, RSI band, MACD cross, Bollinger position and trend strength.
//! MACD and Bollinger use their standard parameters.

use chrono::NaiveDate;

use crate::domain::error::{StockwatchError, ValidationError};
use crate::domain::indicator::{
    IndicatorType, Series, bollinger, calculate_bollinger, calculate_macd_default, calculate_roc,
    calculate_rsi, calculate_sma, macd,
};
use crate::domain::ohlcv::{OhlcvBar, closes, validate_bars};
use crate::domain::signal::{SignalPoint, TradeSignal};
use crate::domain::strategy::StrategyProfile;

const TREND_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeConfig {
    pub ma_fast: usize,
    pub ma_slow: usize,
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    /// MA window whose bar-to-bar percent change is the trend term.
    pub trend_window: usize,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        CompositeConfig {
            ma_fast: 5,
            ma_slow: 20,
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
            trend_window: 20,
        }
    }
}

impl CompositeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ma_fast == 0 || self.ma_fast >= self.ma_slow {
            return Err(ValidationError::InvalidParameter {
                name: "ma_fast",
                reason: format!(
                    "must be positive and below ma_slow ({}), got {}",
                    self.ma_slow, self.ma_fast
                ),
            });
        }
        let levels_ok = self.oversold > 0.0
            && self.overbought < 100.0
            && self.oversold < self.overbought;
        if !levels_ok {
            return Err(ValidationError::InvalidParameter {
                name: "oversold",
                reason: format!(
                    "need 0 < oversold < overbought < 100, got {} and {}",
                    self.oversold, self.overbought
                ),
            });
        }
        Ok(())
    }
}

/// Per-bar breakdown of the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CompositeRow {
    pub date: NaiveDate,
    pub ma_signal: i8,
    pub rsi_signal: i8,
    pub macd_signal: i8,
    pub bb_position: Option<f64>,
    pub trend_strength: Option<f64>,
    pub composite: Option<f64>,
}

impl CompositeRow {
    /// Decision for this bar under `profile`. Hold when the score is not
    /// available.
    pub fn decide(&self, profile: StrategyProfile) -> TradeSignal {
        let Some(score) = self.composite else {
            return TradeSignal::Hold;
        };
        if self.ma_signal == 1 && self.rsi_signal != -1 && score >= profile.buy_threshold() {
            TradeSignal::Buy
        } else if self.ma_signal == -1
            && self.rsi_signal != 1
            && score <= profile.sell_threshold()
        {
            TradeSignal::Sell
        } else {
            TradeSignal::Hold
        }
    }
}

fn cross_signal(fast: &Series, slow: &Series, i: usize) -> i8 {
    let diff = |j: usize| Some(fast.get(j)? - slow.get(j)?);
    let Some(prev_index) = i.checked_sub(1) else {
        return 0;
    };
    match (diff(prev_index), diff(i)) {
        (Some(prev), Some(now)) if prev <= 0.0 && now > 0.0 => 1,
        (Some(prev), Some(now)) if prev >= 0.0 && now < 0.0 => -1,
        _ => 0,
    }
}

fn band_signal(rsi: Option<f64>, oversold: f64, overbought: f64) -> i8 {
    match rsi {
        Some(v) if v <= oversold => 1,
        Some(v) if v >= overbought => -1,
        _ => 0,
    }
}

fn tagged<T>(
    indicator: IndicatorType,
    result: Result<T, crate::domain::error::IndicatorError>,
) -> Result<T, StockwatchError> {
    result.map_err(|source| StockwatchError::Indicator { indicator, source })
}

/// Composite breakdown for every bar.
pub fn composite_scores(
    bars: &[OhlcvBar],
    config: &CompositeConfig,
) -> Result<Vec<CompositeRow>, StockwatchError> {
    config.validate()?;
    validate_bars(bars)?;
    let closes = closes(bars);

    let fast = tagged(
        IndicatorType::Sma(config.ma_fast),
        calculate_sma(&closes, config.ma_fast),
    )?;
    let slow = tagged(
        IndicatorType::Sma(config.ma_slow),
        calculate_sma(&closes, config.ma_slow),
    )?;
    let rsi = tagged(
        IndicatorType::Rsi(config.rsi_period),
        calculate_rsi(&closes, config.rsi_period),
    )?;
    let macd = tagged(
        IndicatorType::Macd {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        },
        calculate_macd_default(&closes),
    )?;
    let bands = tagged(
        IndicatorType::bollinger(bollinger::DEFAULT_WINDOW, bollinger::DEFAULT_MULTIPLIER),
        calculate_bollinger(
            &closes,
            bollinger::DEFAULT_WINDOW,
            bollinger::DEFAULT_MULTIPLIER,
        ),
    )?;
    let trend_ma = tagged(
        IndicatorType::Sma(config.trend_window),
        calculate_sma(&closes, config.trend_window),
    )?;
    let trend = tagged(IndicatorType::Roc(1), calculate_roc(&trend_ma, 1))?;

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let ma_signal = cross_signal(&fast, &slow, i);
            let rsi_signal = band_signal(rsi.get(i), config.oversold, config.overbought);
            let macd_signal = cross_signal(&macd.line, &macd.signal, i);

            let bb_position = match (bands.upper.get(i), bands.lower.get(i)) {
                (Some(upper), Some(lower)) if upper > lower => {
                    Some((bar.close - lower) / (upper - lower))
                }
                (Some(_), Some(_)) => Some(0.5),
                _ => None,
            };
            let trend_strength = trend.get(i);

            let composite = bb_position.zip(trend_strength).map(|(pos, roc)| {
                let bb_term = ((pos - 0.5) * 2.0).clamp(-1.0, 1.0);
                let trend_term = (roc / TREND_SCALE).clamp(-1.0, 1.0);
                (f64::from(ma_signal) + f64::from(rsi_signal) + f64::from(macd_signal)
                    + bb_term
                    + trend_term)
                    / 5.0
            });

            CompositeRow {
                date: bar.date,
                ma_signal,
                rsi_signal,
                macd_signal,
                bb_position,
                trend_strength,
                composite,
            }
        })
        .collect();
    Ok(rows)
}

/// One dated trading signal per bar under `profile`.
pub fn generate_trading_signals(
    bars: &[OhlcvBar],
    config: &CompositeConfig,
    profile: StrategyProfile,
) -> Result<Vec<SignalPoint>, StockwatchError> {
    let rows = composite_scores(bars, config)?;
    Ok(rows
        .iter()
        .map(|row| SignalPoint {
            date: row.date,
            signal: row.decide(profile),
        })
        .collect())
}
