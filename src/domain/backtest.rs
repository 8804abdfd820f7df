//! Backtest engine and event loop.
//!
//! Replays a dated signal stream over a bar series for a single symbol:
//! each bar records the portfolio value before acting, then a buy signal
//! invests a fixed fraction of cash and a sell signal closes the position.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::ValidationError;
use super::execution::{ExecutionParams, execute_buy, execute_sell_all};
use super::metrics::{Metrics, period_returns};
use super::ohlcv::{OhlcvBar, validate_bars};
use super::portfolio::{OrderRejection, Portfolio, Side, Transaction};
use super::position::ClosedTrade;
use super::signal::{SignalPoint, TradeSignal};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub initial_capital: f64,
    pub position_size: f64,
    pub transaction_cost: f64,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            symbol: "ASSET".to_string(),
            initial_capital: 100_000.0,
            position_size: 0.1,
            transaction_cost: 0.001,
            risk_free_rate: 0.02,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |name: &'static str, reason: String| {
            Err(ValidationError::InvalidParameter { name, reason })
        };
        if self.symbol.trim().is_empty() {
            return invalid("symbol", "must not be empty".into());
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return invalid(
                "initial_capital",
                format!("must be positive, got {}", self.initial_capital),
            );
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return invalid(
                "position_size",
                format!("must be in (0, 1], got {}", self.position_size),
            );
        }
        if !(self.transaction_cost >= 0.0 && self.transaction_cost < 1.0) {
            return invalid(
                "transaction_cost",
                format!("must be in [0, 1), got {}", self.transaction_cost),
            );
        }
        if !(self.risk_free_rate >= 0.0 && self.risk_free_rate < 1.0) {
            return invalid(
                "risk_free_rate",
                format!("must be in [0, 1), got {}", self.risk_free_rate),
            );
        }
        Ok(())
    }

    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams {
            position_size: self.position_size,
            transaction_cost: self.transaction_cost,
        }
    }
}

/// An order the engine attempted but the portfolio refused.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RejectedOrder {
    pub date: NaiveDate,
    pub side: Side,
    pub reason: OrderRejection,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestResult {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dates: Vec<NaiveDate>,
    /// Portfolio value on each simulated bar, recorded before acting.
    pub values: Vec<f64>,
    pub returns: Vec<f64>,
    pub metrics: Metrics,
    pub transactions: Vec<Transaction>,
    pub closed_trades: Vec<ClosedTrade>,
    pub rejected_orders: Vec<RejectedOrder>,
}

impl BacktestResult {
    /// Cash plus the open position marked at the last simulated close.
    pub fn final_value(&self) -> f64 {
        self.metrics.final_capital
    }
}

/// Keep only bars that have a signal on the same date, paired with it.
fn align<'a>(
    bars: &'a [OhlcvBar],
    signals: &[SignalPoint],
) -> Result<Vec<(&'a OhlcvBar, TradeSignal)>, ValidationError> {
    let mut by_date: HashMap<NaiveDate, TradeSignal> = HashMap::with_capacity(signals.len());
    for point in signals {
        if by_date.insert(point.date, point.signal).is_some() {
            return Err(ValidationError::UnorderedDates { date: point.date });
        }
    }
    let aligned: Vec<_> = bars
        .iter()
        .filter_map(|bar| by_date.get(&bar.date).map(|&s| (bar, s)))
        .collect();
    if aligned.is_empty() {
        return Err(ValidationError::NoOverlap);
    }
    if aligned.len() < bars.len() || aligned.len() < signals.len() {
        debug!(
            bars = bars.len(),
            signals = signals.len(),
            overlap = aligned.len(),
            "aligned bars and signals on common dates"
        );
    }
    Ok(aligned)
}

pub fn run_backtest(
    bars: &[OhlcvBar],
    signals: &[SignalPoint],
    config: &BacktestConfig,
) -> Result<BacktestResult, ValidationError> {
    config.validate()?;
    validate_bars(bars)?;
    let aligned = align(bars, signals)?;

    let params = config.execution_params();
    let symbol = config.symbol.as_str();
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut dates = Vec::with_capacity(aligned.len());
    let mut values = Vec::with_capacity(aligned.len());
    let mut rejected_orders = Vec::new();

    for (bar, signal) in aligned {
        dates.push(bar.date);
        values.push(portfolio.value_at(symbol, bar.close));

        let (side, outcome) = match signal {
            TradeSignal::Hold => continue,
            TradeSignal::Buy => (
                Side::Buy,
                execute_buy(&mut portfolio, symbol, bar.close, bar.date, &params),
            ),
            TradeSignal::Sell => (
                Side::Sell,
                execute_sell_all(&mut portfolio, symbol, bar.close, bar.date, &params),
            ),
        };

        match outcome {
            Ok(tx) => debug!(
                date = %tx.date,
                side = ?tx.side,
                quantity = tx.quantity,
                price = tx.price,
                fee = tx.fee,
                cash = tx.cash_after,
                "order executed"
            ),
            Err(reason) => {
                debug!(date = %bar.date, ?side, %reason, "order rejected");
                rejected_orders.push(RejectedOrder {
                    date: bar.date,
                    side,
                    reason,
                });
            }
        }
    }

    let returns = period_returns(&values);
    let metrics = Metrics::compute(
        &values,
        config.initial_capital,
        portfolio.transactions.len(),
        &portfolio.closed_trades,
        config.risk_free_rate,
    );

    let (start_date, end_date) = match (dates.first(), dates.last()) {
        (Some(&start), Some(&end)) => (start, end),
        _ => return Err(ValidationError::NoOverlap),
    };

    info!(
        symbol,
        bars = values.len(),
        trades = metrics.trade_count,
        rejected = rejected_orders.len(),
        total_return = metrics.total_return,
        "backtest complete"
    );

    Ok(BacktestResult {
        symbol: config.symbol.clone(),
        start_date,
        end_date,
        dates,
        values,
        returns,
        metrics,
        transactions: portfolio.transactions,
        closed_trades: portfolio.closed_trades,
        rejected_orders,
    })
}
