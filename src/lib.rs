//! stockwatch: technical indicators, signal fusion, backtesting and signal
//! reliability scanning over daily OHLCV bars.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod domain;
pub mod ports;

pub use domain::analysis::{AnalysisConfig, AnalysisReport, analyze};
pub use domain::backtest::{BacktestConfig, BacktestResult, run_backtest};
pub use domain::batch::{ScanOutcome, ScanSettings, scan_watchlist};
pub use domain::bundle::{IndicatorBundle, IndicatorConfig, SeriesName};
pub use domain::error::{IndicatorError, StockwatchError, ValidationError};
pub use domain::ohlcv::OhlcvBar;
pub use domain::reliability::{ReliabilityReport, ScannerConfig, scan};
pub use domain::signal::{SignalEvent, SignalPoint, TradeSignal, generate_trading_signals};
pub use domain::strategy::StrategyProfile;
pub use domain::watchlist::{Watchlist, parse_watchlist};
