//! Portfolio state: cash, open positions and transaction history.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::position::{ClosedTrade, Fill, Holding, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Transaction {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub price: f64,
    pub fee: f64,
    pub cash_after: f64,
}

/// Why an order was not executed. Rejections leave the portfolio untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OrderRejection {
    #[error("order quantity is zero")]
    ZeroQuantity,

    #[error("insufficient cash: need {needed:.2}, have {available:.2}")]
    InsufficientCash { needed: f64, available: f64 },

    #[error("no open position in {symbol}")]
    NoPosition { symbol: String },

    #[error("cannot sell {requested} shares of {symbol}, holding {held}")]
    Oversell {
        symbol: String,
        requested: u64,
        held: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    positions: HashMap<String, Position>,
    pub transactions: Vec<Transaction>,
    pub closed_trades: Vec<ClosedTrade>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            positions: HashMap::new(),
            transactions: Vec::new(),
            closed_trades: Vec::new(),
        }
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    fn take_holding(&mut self, symbol: &str) -> Holding {
        self.positions
            .remove(symbol)
            .map_or(Holding::Empty, Holding::Open)
    }

    fn put_holding(&mut self, holding: Holding) {
        if let Holding::Open(position) = holding {
            self.positions.insert(position.symbol.clone(), position);
        }
    }

    /// Buy `quantity` shares at `price`, paying `quantity * price * fee_rate`
    /// on top. Rejected when cash would go negative.
    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: f64,
        fee_rate: f64,
        date: NaiveDate,
    ) -> Result<Transaction, OrderRejection> {
        if quantity == 0 {
            return Err(OrderRejection::ZeroQuantity);
        }
        let cost = quantity as f64 * price;
        let fee = cost * fee_rate;
        let needed = cost + fee;
        if needed > self.cash {
            return Err(OrderRejection::InsufficientCash {
                needed,
                available: self.cash,
            });
        }

        self.cash -= needed;
        let fill = Fill {
            quantity,
            price,
            fee,
            date,
        };
        let holding = self.take_holding(symbol).buy(symbol, fill);
        self.put_holding(holding);
        Ok(self.record(date, symbol, Side::Buy, fill))
    }

    /// Sell `quantity` shares at `price`, receiving the proceeds less
    /// `quantity * price * fee_rate`.
    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: f64,
        fee_rate: f64,
        date: NaiveDate,
    ) -> Result<Transaction, OrderRejection> {
        if quantity == 0 {
            return Err(OrderRejection::ZeroQuantity);
        }
        let held = match self.position(symbol) {
            Some(position) => position.quantity,
            None => {
                return Err(OrderRejection::NoPosition {
                    symbol: symbol.to_string(),
                });
            }
        };
        if quantity > held {
            return Err(OrderRejection::Oversell {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }

        let proceeds = quantity as f64 * price;
        let fee = proceeds * fee_rate;
        let fill = Fill {
            quantity,
            price,
            fee,
            date,
        };
        let holding = self.take_holding(symbol);
        let (holding, closed) = match holding.sell(fill) {
            Some(outcome) => outcome,
            None => {
                return Err(OrderRejection::Oversell {
                    symbol: symbol.to_string(),
                    requested: quantity,
                    held,
                });
            }
        };
        self.put_holding(holding);
        self.closed_trades.extend(closed);
        self.cash += proceeds - fee;
        Ok(self.record(date, symbol, Side::Sell, fill))
    }

    fn record(&mut self, date: NaiveDate, symbol: &str, side: Side, fill: Fill) -> Transaction {
        let transaction = Transaction {
            date,
            symbol: symbol.to_string(),
            side,
            quantity: fill.quantity,
            price: fill.price,
            fee: fill.fee,
            cash_after: self.cash,
        };
        self.transactions.push(transaction.clone());
        transaction
    }

    /// Value of a portfolio holding at most `symbol`, marked at `price`.
    pub fn value_at(&self, symbol: &str, price: f64) -> f64 {
        self.cash + self.position(symbol).map_or(0.0, |p| p.market_value(price))
    }
}
