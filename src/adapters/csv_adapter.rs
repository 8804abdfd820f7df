//! CSV file data adapter.
//!
//! One file per symbol, `<CODE>.csv`, with a header row naming the columns
//! `date,open,high,low,close,volume` (any order, extra columns ignored).

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::error::StockwatchError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn data_error(reason: impl Into<String>) -> StockwatchError {
    StockwatchError::Data {
        reason: reason.into(),
    }
}

/// Positions of the required columns in `headers`.
fn column_positions(headers: &StringRecord) -> Result<[usize; 6], StockwatchError> {
    let mut positions = [0; 6];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| data_error(format!("missing {} column", name)))?;
    }
    Ok(positions)
}

fn field<T: FromStr>(
    record: &StringRecord,
    position: usize,
    name: &str,
    line: u64,
) -> Result<T, StockwatchError>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(position)
        .ok_or_else(|| data_error(format!("line {}: missing {} value", line, name)))?;
    raw.trim()
        .parse()
        .map_err(|e| data_error(format!("line {}: invalid {} value {:?}: {}", line, name, raw, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError> {
        let path = self.csv_path(code);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StockwatchError::NoData {
                    code: code.to_string(),
                });
            }
            Err(e) => {
                return Err(data_error(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("{}: {}", path.display(), e)))?
            .clone();
        let [date_col, open_col, high_col, low_col, close_col, volume_col] =
            column_positions(&headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map_or(0, |p| p.line());

            let raw_date: String = field(&record, date_col, "date", line)?;
            let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d").map_err(|e| {
                data_error(format!("line {}: invalid date {:?}: {}", line, raw_date, e))
            })?;
            if date < start_date || date > end_date {
                continue;
            }

            bars.push(OhlcvBar::new(
                date,
                field(&record, open_col, "open", line)?,
                field(&record, high_col, "high", line)?,
                field(&record, low_col, "low", line)?,
                field(&record, close_col, "close", line)?,
                field(&record, volume_col, "volume", line)?,
            ));
        }

        bars.sort_by_key(|b| b.date);
        if bars.is_empty() {
            warn!(code, %start_date, %end_date, "no bars in range");
        }
        debug!(code, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockwatchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if let (true, Some(stem)) = (is_csv, path.file_stem()) {
                symbols.push(stem.to_string_lossy().into_owned());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
