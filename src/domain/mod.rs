//! Core domain types and logic.

pub mod analysis;
pub mod backtest;
pub mod batch;
pub mod bundle;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod reliability;
pub mod signal;
pub mod strategy;
pub mod watchlist;
