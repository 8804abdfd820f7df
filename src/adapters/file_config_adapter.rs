//! INI file configuration adapter.

use std::path::Path;

use configparser::ini::Ini;

use crate::domain::error::StockwatchError;
use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockwatchError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| StockwatchError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, StockwatchError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| StockwatchError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[indicators]
ma_windows = 5, 10, 20, 60
boll_k = 2.5

[signals]
strategy = moderate
oversold = 25

[backtest]
symbol = 600519
initial_capital = 50000.0
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("indicators", "ma_windows"),
            Some("5, 10, 20, 60".to_string())
        );
        assert_eq!(
            adapter.get_string("signals", "strategy"),
            Some("moderate".to_string())
        );
        assert_eq!(adapter.get_string("indicators", "boll_k"), Some("2.5".to_string()));
    }

    #[test]
    fn missing_keys_and_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("scanner", "warmup"), None);
    }

    #[test]
    fn malformed_values_are_returned_verbatim() {
        let adapter =
            FileConfigAdapter::from_string("[scanner]\nmin_bars = many\nwarmup = 1.5\n").unwrap();
        assert_eq!(adapter.get_string("scanner", "min_bars"), Some("many".to_string()));
        assert_eq!(adapter.get_string("scanner", "warmup"), Some("1.5".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[scanner]\nsignal_filter = MACD\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("scanner", "signal_filter"),
            Some("MACD".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/stockwatch.ini");
        assert!(matches!(result, Err(StockwatchError::ConfigParse { .. })));
    }
}
