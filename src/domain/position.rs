//! Position lifecycle for a single symbol.
//!
//! A position only exists while it holds shares: [`Holding`] is either
//! `Empty` or `Open(Position)`, and a sell that takes the quantity to zero
//! moves it back to `Empty`, producing a [`ClosedTrade`].

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    /// Quantity-weighted average cost across all buys, excluding fees.
    pub entry_price: f64,
    /// Date of the earliest buy still part of this position.
    pub entry_date: NaiveDate,
    /// Buy-side fees not yet attributed to a sale.
    pub entry_fees: f64,
    /// PnL already realized by partial sells.
    pub realized_pnl: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClosedTrade {
    pub symbol: String,
    pub quantity: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Net of buy and sell fees.
    pub pnl: f64,
}

impl ClosedTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

/// A fill applied to a holding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub quantity: u64,
    pub price: f64,
    pub fee: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Holding {
    #[default]
    Empty,
    Open(Position),
}

impl Holding {
    pub fn position(&self) -> Option<&Position> {
        match self {
            Holding::Empty => None,
            Holding::Open(position) => Some(position),
        }
    }

    pub fn quantity(&self) -> u64 {
        self.position().map_or(0, |p| p.quantity)
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.position().map_or(0.0, |p| p.market_value(price))
    }

    /// Add shares. An existing position keeps its entry date and averages
    /// its entry price with the new fill.
    ///
    /// `fill.quantity` must be non-zero.
    pub fn buy(self, symbol: &str, fill: Fill) -> Holding {
        match self {
            Holding::Empty => Holding::Open(Position {
                symbol: symbol.to_string(),
                quantity: fill.quantity,
                entry_price: fill.price,
                entry_date: fill.date,
                entry_fees: fill.fee,
                realized_pnl: 0.0,
            }),
            Holding::Open(position) => {
                let quantity = position.quantity + fill.quantity;
                let cost = position.quantity as f64 * position.entry_price
                    + fill.quantity as f64 * fill.price;
                Holding::Open(Position {
                    quantity,
                    entry_price: cost / quantity as f64,
                    entry_fees: position.entry_fees + fill.fee,
                    ..position
                })
            }
        }
    }

    /// Remove shares. Selling everything closes the position.
    ///
    /// Returns `None` when there is no position or the fill exceeds the
    /// held quantity; callers check both before selling.
    pub fn sell(self, fill: Fill) -> Option<(Holding, Option<ClosedTrade>)> {
        let Holding::Open(position) = self else {
            return None;
        };
        if fill.quantity == 0 || fill.quantity > position.quantity {
            return None;
        }

        let share = fill.quantity as f64 / position.quantity as f64;
        let fees_attributed = position.entry_fees * share;
        let pnl = fill.quantity as f64 * (fill.price - position.entry_price)
            - fees_attributed
            - fill.fee;
        let remaining = position.quantity - fill.quantity;

        if remaining == 0 {
            let trade = ClosedTrade {
                symbol: position.symbol,
                quantity: position.quantity,
                entry_price: position.entry_price,
                exit_price: fill.price,
                entry_date: position.entry_date,
                exit_date: fill.date,
                pnl: position.realized_pnl + pnl,
            };
            return Some((Holding::Empty, Some(trade)));
        }

        let position = Position {
            quantity: remaining,
            entry_fees: position.entry_fees - fees_attributed,
            realized_pnl: position.realized_pnl + pnl,
            ..position
        };
        Some((Holding::Open(position), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn fill(quantity: u64, price: f64, fee: f64, day: u32) -> Fill {
        Fill {
            quantity,
            price,
            fee,
            date: date(day),
        }
    }

    fn sample_position() -> Position {
        Position {
            symbol: "600519".into(),
            quantity: 100,
            entry_price: 50.0,
            entry_date: date(15),
            entry_fees: 0.0,
            realized_pnl: 0.0,
        }
    }

    #[test]
    fn market_value() {
        assert!((sample_position().market_value(55.0) - 5500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_profit_and_loss() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(55.0) - 500.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(45.0) + 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_holding_has_no_value() {
        let holding = Holding::Empty;
        assert_eq!(holding.quantity(), 0);
        assert_eq!(holding.market_value(100.0), 0.0);
        assert!(holding.position().is_none());
    }

    #[test]
    fn buy_opens_position() {
        let holding = Holding::Empty.buy("600519", fill(10, 20.0, 0.2, 2));
        let pos = holding.position().unwrap();
        assert_eq!(pos.quantity, 10);
        assert_eq!(pos.entry_price, 20.0);
        assert_eq!(pos.entry_date, date(2));
        assert_eq!(pos.entry_fees, 0.2);
    }

    #[test]
    fn repeated_buys_average_cost_and_keep_entry_date() {
        let holding = Holding::Empty
            .buy("600519", fill(100, 10.0, 0.0, 2))
            .buy("600519", fill(300, 14.0, 0.0, 5));
        let pos = holding.position().unwrap();
        assert_eq!(pos.quantity, 400);
        assert!((pos.entry_price - 13.0).abs() < 1e-12);
        assert_eq!(pos.entry_date, date(2));
    }

    #[test]
    fn full_sell_closes_position() {
        let holding = Holding::Empty.buy("600519", fill(100, 10.0, 1.0, 2));
        let (holding, trade) = holding.sell(fill(100, 12.0, 1.2, 9)).unwrap();
        assert_eq!(holding, Holding::Empty);

        let trade = trade.unwrap();
        assert_eq!(trade.quantity, 100);
        assert_eq!(trade.exit_price, 12.0);
        assert_eq!(trade.holding_days(), 7);
        // 100 * 2 - 1.0 - 1.2
        assert!((trade.pnl - 197.8).abs() < 1e-9);
    }

    #[test]
    fn partial_sell_keeps_position_open() {
        let holding = Holding::Empty.buy("600519", fill(100, 10.0, 2.0, 2));
        let (holding, trade) = holding.sell(fill(40, 11.0, 0.0, 3)).unwrap();
        assert!(trade.is_none());
        let pos = holding.position().unwrap();
        assert_eq!(pos.quantity, 60);
        assert_eq!(pos.entry_price, 10.0);
        assert!((pos.entry_fees - 1.2).abs() < 1e-12);
        assert!((pos.realized_pnl - (40.0 - 0.8)).abs() < 1e-12);

        let (holding, trade) = holding.sell(fill(60, 10.0, 0.0, 4)).unwrap();
        assert_eq!(holding, Holding::Empty);
        // realized 39.2, then 0 price pnl - 1.2 remaining fees
        assert!((trade.unwrap().pnl - 38.0).abs() < 1e-9);
    }

    #[test]
    fn oversell_and_empty_sell_rejected() {
        assert!(Holding::Empty.sell(fill(1, 10.0, 0.0, 2)).is_none());
        let holding = Holding::Empty.buy("600519", fill(10, 10.0, 0.0, 2));
        assert!(holding.clone().sell(fill(11, 10.0, 0.0, 3)).is_none());
        assert!(holding.sell(fill(0, 10.0, 0.0, 3)).is_none());
    }
}
