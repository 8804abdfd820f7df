#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
pub use stockwatch::domain::ohlcv::OhlcvBar;
use stockwatch::domain::error::StockwatchError;
use stockwatch::domain::signal::{SignalPoint, TradeSignal};
use stockwatch::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(StockwatchError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(code).ok_or_else(|| StockwatchError::NoData {
            code: code.to_string(),
        })?;
        Ok(bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockwatchError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        close,
        close + 1.0,
        close - 1.0,
        close,
        1000,
    )
}

/// Consecutive daily bars with the given closes.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            OhlcvBar::new(
                start + chrono::Duration::days(i as i64),
                close,
                close + 1.0,
                close - 1.0,
                close,
                1000 + (i as i64 % 7) * 100,
            )
        })
        .collect()
}

/// Linear ramp starting at `start_price`, one point per bar.
pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(start, &closes)
}

/// Oscillating series with a slight upward drift.
pub fn wave_bars(start: NaiveDate, count: usize, phase: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 50.0 + ((i as f64) * 0.25 + phase).sin() * 8.0 + i as f64 * 0.02)
        .collect();
    bars_from_closes(start, &closes)
}

pub fn signals_for(bars: &[OhlcvBar], at: &[(usize, TradeSignal)]) -> Vec<SignalPoint> {
    let mut signals: Vec<SignalPoint> = bars
        .iter()
        .map(|b| SignalPoint {
            date: b.date,
            signal: TradeSignal::Hold,
        })
        .collect();
    for &(i, signal) in at {
        signals[i].signal = signal;
    }
    signals
}
