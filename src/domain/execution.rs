//! Order sizing and execution against a [`Portfolio`].
//!
//! Buys invest a fixed fraction of current cash in whole shares, with the
//! transaction cost charged on top of the notional. Sells always close the
//! whole position at the bar's close, less the transaction cost.

use chrono::NaiveDate;

use super::portfolio::{OrderRejection, Portfolio, Transaction};

/// Parameters controlling order execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionParams {
    /// Fraction of current cash committed per buy, in (0, 1].
    pub position_size: f64,
    /// Fee as a fraction of trade notional, in [0, 1).
    pub transaction_cost: f64,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        ExecutionParams {
            position_size: 0.1,
            transaction_cost: 0.001,
        }
    }
}

/// Fee charged on a trade: `trade_value * transaction_cost`.
pub fn calculate_fee(trade_value: f64, transaction_cost: f64) -> f64 {
    trade_value * transaction_cost
}

/// Whole shares affordable when investing `cash * position_size` at
/// `price` including the transaction cost.
///
/// shares = floor(cash * position_size / (price * (1 + transaction_cost)))
pub fn size_order(cash: f64, price: f64, params: &ExecutionParams) -> u64 {
    if !(price > 0.0) || !(cash > 0.0) {
        return 0;
    }
    let investable = cash * params.position_size;
    let per_share = price * (1.0 + params.transaction_cost);
    let shares = (investable / per_share).floor();
    if shares.is_finite() && shares > 0.0 {
        shares as u64
    } else {
        0
    }
}

/// Size and place a buy at `price`.
pub fn execute_buy(
    portfolio: &mut Portfolio,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    params: &ExecutionParams,
) -> Result<Transaction, OrderRejection> {
    let quantity = size_order(portfolio.cash, price, params);
    portfolio.buy(symbol, quantity, price, params.transaction_cost, date)
}

/// Sell the entire open position in `symbol` at `price`.
pub fn execute_sell_all(
    portfolio: &mut Portfolio,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    params: &ExecutionParams,
) -> Result<Transaction, OrderRejection> {
    let quantity = portfolio
        .position(symbol)
        .map(|p| p.quantity)
        .ok_or_else(|| OrderRejection::NoPosition {
            symbol: symbol.to_string(),
        })?;
    portfolio.sell(symbol, quantity, price, params.transaction_cost, date)
}
