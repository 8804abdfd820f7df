//! Typed configuration loaders.
//!
//! Each loader reads one INI section through a [`ConfigPort`], falls back
//! to the documented default for a missing key, and rejects a present but
//! malformed or out-of-range value with `ConfigInvalid`. Values are never
//! silently replaced by defaults.

use std::fmt::Display;
use std::str::FromStr;

use crate::domain::analysis::AnalysisConfig;
use crate::domain::backtest::BacktestConfig;
use crate::domain::bundle::IndicatorConfig;
use crate::domain::error::{StockwatchError, ValidationError};
use crate::domain::reliability::ScannerConfig;
use crate::domain::signal::CompositeConfig;
use crate::domain::strategy::StrategyProfile;
use crate::ports::config_port::ConfigPort;

const INDICATORS: &str = "indicators";
const SIGNALS: &str = "signals";
const BACKTEST: &str = "backtest";
const SCANNER: &str = "scanner";

fn raw(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read<T>(config: &dyn ConfigPort, section: &str, key: &str, default: T) -> Result<T, StockwatchError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw(config, section, key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e| {
            StockwatchError::config_invalid(section, key, format!("{:?}: {}", value, e))
        }),
    }
}

fn read_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Vec<usize>,
) -> Result<Vec<usize>, StockwatchError> {
    let Some(value) = raw(config, section, key) else {
        return Ok(default);
    };
    value
        .split(',')
        .map(|item| {
            item.trim().parse::<usize>().map_err(|e| {
                StockwatchError::config_invalid(section, key, format!("{:?}: {}", item.trim(), e))
            })
        })
        .collect()
}

fn require_positive(section: &str, key: &str, value: usize) -> Result<usize, StockwatchError> {
    if value == 0 {
        return Err(StockwatchError::config_invalid(section, key, "must be positive"));
    }
    Ok(value)
}

/// Attribute a struct-level validation failure to a key in `section`.
fn in_section(section: &'static str) -> impl Fn(ValidationError) -> StockwatchError {
    move |err| match err {
        ValidationError::InvalidParameter { name, reason } => {
            StockwatchError::config_invalid(section, name, reason)
        }
        ValidationError::EmptyInput { what } => {
            StockwatchError::config_invalid(section, what, "must not be empty")
        }
        other => StockwatchError::Validation(other),
    }
}

pub fn load_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, StockwatchError> {
    let d = IndicatorConfig::default();
    let s = INDICATORS;

    let ma_windows = read_list(config, s, "ma_windows", d.ma_windows)?;
    let rsi_periods = read_list(config, s, "rsi_periods", d.rsi_periods)?;
    for (key, list) in [("ma_windows", &ma_windows), ("rsi_periods", &rsi_periods)] {
        if list.is_empty() || list.contains(&0) {
            return Err(StockwatchError::config_invalid(
                s,
                key,
                "needs one or more positive values",
            ));
        }
    }

    let macd_fast = require_positive(s, "macd_fast", read(config, s, "macd_fast", d.macd_fast)?)?;
    let macd_slow = require_positive(s, "macd_slow", read(config, s, "macd_slow", d.macd_slow)?)?;
    if macd_fast >= macd_slow {
        return Err(StockwatchError::config_invalid(
            s,
            "macd_fast",
            format!("must be below macd_slow ({})", macd_slow),
        ));
    }

    let boll_k: f64 = read(config, s, "boll_k", d.boll_k)?;
    if !(boll_k.is_finite() && boll_k > 0.0) {
        return Err(StockwatchError::config_invalid(s, "boll_k", "must be positive"));
    }

    let indicators = IndicatorConfig {
        ma_windows,
        macd_fast,
        macd_slow,
        macd_signal: require_positive(
            s,
            "macd_signal",
            read(config, s, "macd_signal", d.macd_signal)?,
        )?,
        rsi_periods,
        kdj_window: require_positive(s, "kdj_window", read(config, s, "kdj_window", d.kdj_window)?)?,
        kdj_d_smooth: require_positive(
            s,
            "kdj_d_smooth",
            read(config, s, "kdj_d_smooth", d.kdj_d_smooth)?,
        )?,
        kdj_j_smooth: require_positive(
            s,
            "kdj_j_smooth",
            read(config, s, "kdj_j_smooth", d.kdj_j_smooth)?,
        )?,
        boll_window: require_positive(
            s,
            "boll_window",
            read(config, s, "boll_window", d.boll_window)?,
        )?,
        boll_k,
    };
    indicators.check_rule_operands().map_err(in_section(s))?;
    Ok(indicators)
}

pub fn load_strategy(config: &dyn ConfigPort) -> Result<StrategyProfile, StockwatchError> {
    match raw(config, SIGNALS, "strategy") {
        None => Ok(StrategyProfile::default()),
        Some(name) => name
            .parse()
            .map_err(|e: ValidationError| StockwatchError::config_invalid(SIGNALS, "strategy", e.to_string())),
    }
}

pub fn load_composite_config(config: &dyn ConfigPort) -> Result<CompositeConfig, StockwatchError> {
    let d = CompositeConfig::default();
    let s = SIGNALS;
    let composite = CompositeConfig {
        ma_fast: read(config, s, "ma_fast", d.ma_fast)?,
        ma_slow: read(config, s, "ma_slow", d.ma_slow)?,
        rsi_period: require_positive(s, "rsi_period", read(config, s, "rsi_period", d.rsi_period)?)?,
        oversold: read(config, s, "oversold", d.oversold)?,
        overbought: read(config, s, "overbought", d.overbought)?,
        trend_window: require_positive(
            s,
            "trend_window",
            read(config, s, "trend_window", d.trend_window)?,
        )?,
    };
    composite.validate().map_err(in_section(s))?;
    Ok(composite)
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StockwatchError> {
    let d = BacktestConfig::default();
    let s = BACKTEST;
    let backtest = BacktestConfig {
        symbol: raw(config, s, "symbol").unwrap_or(d.symbol),
        initial_capital: read(config, s, "initial_capital", d.initial_capital)?,
        position_size: read(config, s, "position_size", d.position_size)?,
        transaction_cost: read(config, s, "transaction_cost", d.transaction_cost)?,
        risk_free_rate: read(config, s, "risk_free_rate", d.risk_free_rate)?,
    };
    backtest.validate().map_err(in_section(s))?;
    Ok(backtest)
}

pub fn load_scanner_config(config: &dyn ConfigPort) -> Result<ScannerConfig, StockwatchError> {
    let d = ScannerConfig::default();
    let s = SCANNER;
    let scanner = ScannerConfig {
        warmup: read(config, s, "warmup", d.warmup)?,
        min_bars: read(config, s, "min_bars", d.min_bars)?,
        horizons: read_list(config, s, "horizons", d.horizons)?,
        min_triggers: read(config, s, "min_triggers", d.min_triggers)?,
        ranking_horizon: read(config, s, "ranking_horizon", d.ranking_horizon)?,
        signal_filter: raw(config, s, "signal_filter"),
        indicators: load_indicator_config(config)?,
    };
    scanner.validate().map_err(in_section(s))?;
    Ok(scanner)
}

pub fn load_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, StockwatchError> {
    Ok(AnalysisConfig {
        indicators: load_indicator_config(config)?,
        composite: load_composite_config(config)?,
        strategy: load_strategy(config)?,
    })
}
