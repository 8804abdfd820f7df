//! Watchlist parsing.
//!
//! One symbol per line. The code is the first whitespace-separated token;
//! anything after it is kept as a free-form label. Blank lines and lines
//! starting with `#` are skipped.

use std::collections::HashSet;
use std::path::Path;

use crate::domain::error::StockwatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WatchlistEntry {
    pub code: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Watchlist {
    pub entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    pub fn codes(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.code.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchlistError {
    #[error("duplicate code {code} on line {line}")]
    DuplicateCode { code: String, line: usize },

    #[error("watchlist has no codes")]
    Empty,
}

pub fn parse_watchlist(content: &str) -> Result<Watchlist, WatchlistError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for (n, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let Some(token) = parts.next() else {
            continue;
        };
        let code = token.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(WatchlistError::DuplicateCode { code, line: n + 1 });
        }
        let label = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        entries.push(WatchlistEntry { code, label });
    }

    if entries.is_empty() {
        return Err(WatchlistError::Empty);
    }
    Ok(Watchlist { entries })
}

pub fn load_watchlist(path: &Path) -> Result<Watchlist, StockwatchError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_watchlist(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_labels() {
        let list = parse_watchlist("300098 Gosuncn\n600519\n").unwrap();
        assert_eq!(list.codes(), vec!["300098", "600519"]);
        assert_eq!(list.entries[0].label.as_deref(), Some("Gosuncn"));
        assert_eq!(list.entries[1].label, None);
    }

    #[test]
    fn test_skips_comments_and_blanks() {
        let content = "# my list\n\n  cba  Commonwealth Bank \n\t\n# bhp\nwbc\n";
        let list = parse_watchlist(content).unwrap();
        assert_eq!(list.codes(), vec!["CBA", "WBC"]);
        assert_eq!(list.entries[0].label.as_deref(), Some("Commonwealth Bank"));
    }

    #[test]
    fn test_duplicate_reports_line() {
        let result = parse_watchlist("CBA\nBHP\ncba first-again\n");
        assert_eq!(
            result,
            Err(WatchlistError::DuplicateCode {
                code: "CBA".into(),
                line: 3
            })
        );
    }

    #[test]
    fn test_empty_watchlist() {
        assert_eq!(parse_watchlist("# nothing\n\n"), Err(WatchlistError::Empty));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.txt");
        std::fs::write(&path, "AAA\nBBB label\n").unwrap();
        let list = load_watchlist(&path).unwrap();
        assert_eq!(list.len(), 2);

        let missing = load_watchlist(&dir.path().join("nope.txt"));
        assert!(matches!(missing, Err(StockwatchError::Io(_))));
    }
}
