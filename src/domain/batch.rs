//! Parallel reliability scan over a watchlist.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::error::{ComputationError, StockwatchError};
use crate::domain::reliability::{ReliabilityReport, ScannerConfig, scan};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanSettings {
    pub scanner: ScannerConfig,
    /// Cap on rayon worker threads; `None` uses the global pool.
    pub threads: Option<usize>,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub code: String,
    pub result: Result<ReliabilityReport, StockwatchError>,
}

impl ScanOutcome {
    pub fn report(&self) -> Option<&ReliabilityReport> {
        self.result.as_ref().ok()
    }
}

fn scan_one(
    port: &dyn DataPort,
    code: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &ScannerConfig,
) -> Result<ReliabilityReport, StockwatchError> {
    let bars = port.fetch_ohlcv(code, start, end)?;
    if bars.is_empty() {
        return Err(StockwatchError::NoData {
            code: code.to_string(),
        });
    }
    Ok(scan(&bars, config)?)
}

/// Scan every code, one outcome per code in input order.
///
/// A failing code is reported in its outcome and does not stop the batch.
pub fn scan_watchlist(
    port: &dyn DataPort,
    codes: &[String],
    start: NaiveDate,
    end: NaiveDate,
    settings: &ScanSettings,
) -> Result<Vec<ScanOutcome>, StockwatchError> {
    settings.scanner.validate()?;

    let run = || -> Vec<ScanOutcome> {
        codes
            .par_iter()
            .map(|code| ScanOutcome {
                code: code.clone(),
                result: scan_one(port, code, start, end, &settings.scanner),
            })
            .collect()
    };
    let outcomes = match settings.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ComputationError {
                context: "thread pool".into(),
                reason: e.to_string(),
            })?
            .install(run),
        None => run(),
    };

    for outcome in &outcomes {
        if let Err(error) = &outcome.result {
            warn!(code = %outcome.code, %error, "scan failed");
        }
    }
    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(
        codes = codes.len(),
        succeeded,
        failed = codes.len() - succeeded,
        "watchlist scan complete"
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use std::collections::HashMap;

    struct MapPort {
        series: HashMap<String, Vec<OhlcvBar>>,
    }

    impl DataPort for MapPort {
        fn fetch_ohlcv(
            &self,
            code: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, StockwatchError> {
            let bars = self.series.get(code).ok_or_else(|| StockwatchError::NoData {
                code: code.to_string(),
            })?;
            Ok(bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .cloned()
                .collect())
        }

        fn list_symbols(&self) -> Result<Vec<String>, StockwatchError> {
            let mut codes: Vec<String> = self.series.keys().cloned().collect();
            codes.sort();
            Ok(codes)
        }
    }

    fn make_bars(n: usize, phase: f64) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let c = 50.0 + ((i as f64) * 0.3 + phase).sin() * 6.0;
                OhlcvBar::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                    c,
                    c + 0.5,
                    c - 0.5,
                    c,
                    1_000,
                )
            })
            .collect()
    }

    fn port() -> MapPort {
        let mut series = HashMap::new();
        series.insert("AAA".to_string(), make_bars(120, 0.0));
        series.insert("BBB".to_string(), make_bars(120, 1.3));
        series.insert("SHORT".to_string(), make_bars(20, 0.0));
        MapPort { series }
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    #[test]
    fn outcomes_in_input_order() {
        let codes: Vec<String> = ["BBB", "MISSING", "AAA", "SHORT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (start, end) = window();
        let outcomes =
            scan_watchlist(&port(), &codes, start, end, &ScanSettings::default()).unwrap();

        let order: Vec<&str> = outcomes.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(order, vec!["BBB", "MISSING", "AAA", "SHORT"]);
        assert!(outcomes[0].report().is_some());
        assert!(matches!(
            outcomes[1].result,
            Err(StockwatchError::NoData { .. })
        ));
        assert!(outcomes[2].report().is_some());
        assert!(outcomes[3].result.as_ref().is_err_and(|e| e.is_validation()));
    }

    #[test]
    fn parallel_matches_sequential() {
        let port = port();
        let codes = vec!["AAA".to_string(), "BBB".to_string()];
        let (start, end) = window();
        let settings = ScanSettings {
            threads: Some(2),
            ..Default::default()
        };
        let outcomes = scan_watchlist(&port, &codes, start, end, &settings).unwrap();
        for outcome in outcomes {
            let bars = port.fetch_ohlcv(&outcome.code, start, end).unwrap();
            let direct = scan(&bars, &settings.scanner).unwrap();
            assert_eq!(outcome.report(), Some(&direct));
        }
    }

    #[test]
    fn empty_range_is_no_data() {
        let codes = vec!["AAA".to_string()];
        let day = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let outcomes = scan_watchlist(&port(), &codes, day, day, &ScanSettings::default()).unwrap();
        assert!(matches!(
            outcomes[0].result,
            Err(StockwatchError::NoData { .. })
        ));
    }

    #[test]
    fn invalid_scanner_config_aborts() {
        let settings = ScanSettings {
            scanner: ScannerConfig {
                horizons: vec![],
                ..Default::default()
            },
            threads: None,
        };
        let (start, end) = window();
        let result = scan_watchlist(&port(), &["AAA".to_string()], start, end, &settings);
        assert!(result.is_err());
    }
}
