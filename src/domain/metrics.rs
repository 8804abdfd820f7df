//! Performance metrics over a portfolio-value series.

use super::position::ClosedTrade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metrics {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    /// Most negative peak-to-trough decline as a fraction (≤ 0).
    pub max_drawdown: f64,
    /// Longest run of bars spent below a previous peak.
    pub max_drawdown_duration: usize,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Fraction of periods with a positive return.
    pub win_rate: f64,
    /// Executed transactions, buys and sells.
    pub trade_count: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub profit_factor: f64,
    pub avg_trade_duration: f64,
}

impl Metrics {
    pub fn compute(
        values: &[f64],
        initial_capital: f64,
        trade_count: usize,
        closed_trades: &[ClosedTrade],
        risk_free_rate: f64,
    ) -> Self {
        let final_capital = values.last().copied().unwrap_or(initial_capital);

        let (total_return, annualized_return) = if initial_capital > 0.0 && !values.is_empty() {
            let growth = final_capital / initial_capital;
            let years_exp = TRADING_DAYS_PER_YEAR / values.len() as f64;
            (growth - 1.0, growth.powf(years_exp) - 1.0)
        } else {
            (0.0, 0.0)
        };

        let returns = period_returns(values);
        let trades_won = closed_trades.iter().filter(|t| t.pnl > 0.0).count();
        let trades_lost = closed_trades.iter().filter(|t| t.pnl < 0.0).count();
        let avg_trade_duration = if closed_trades.is_empty() {
            0.0
        } else {
            closed_trades.iter().map(|t| t.holding_days()).sum::<i64>() as f64
                / closed_trades.len() as f64
        };

        Metrics {
            initial_capital,
            final_capital,
            total_return,
            annualized_return,
            max_drawdown: max_drawdown(values),
            max_drawdown_duration: max_drawdown_duration(values),
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            sortino_ratio: sortino_ratio(&returns, risk_free_rate),
            win_rate: win_rate(&returns),
            trade_count,
            trades_won,
            trades_lost,
            profit_factor: profit_factor(closed_trades),
            avg_trade_duration,
        }
    }
}

/// Percent change between consecutive values. A zero base yields 0.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// min over time of (value - running_max) / running_max.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in values {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min((value - peak) / peak);
        }
    }
    worst
}

fn max_drawdown_duration(values: &[f64]) -> usize {
    let mut peak = f64::NEG_INFINITY;
    let mut current = 0usize;
    let mut longest = 0usize;
    for &value in values {
        if value >= peak {
            peak = value;
            current = 0;
        } else {
            current += 1;
            longest = longest.max(current);
        }
    }
    longest
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_stddev(xs: &[f64]) -> f64 {
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Annualized Sharpe ratio; 0 with fewer than two returns or zero volatility.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess = mean(returns) - daily_rf;
    let volatility = sample_stddev(returns);
    if volatility == 0.0 {
        return 0.0;
    }
    excess / volatility * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio using the RMS of negative excess returns.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let downside: Vec<f64> = excess.iter().copied().filter(|x| *x < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    let downside_dev = (downside.iter().map(|x| x * x).sum::<f64>() / downside.len() as f64).sqrt();
    if downside_dev == 0.0 {
        return 0.0;
    }
    mean(&excess) / downside_dev * TRADING_DAYS_PER_YEAR.sqrt()
}

pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64
}

/// Gross profit over gross loss of closed trades.
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    let wins: f64 = trades.iter().map(|t| t.pnl).filter(|p| *p > 0.0).sum();
    let losses: f64 = trades.iter().map(|t| t.pnl).filter(|p| *p < 0.0).map(f64::abs).sum();
    if losses > 0.0 {
        wins / losses
    } else if wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}
