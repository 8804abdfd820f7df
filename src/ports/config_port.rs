//! Configuration access port.

/// Sectioned key/value lookups.
///
/// Values come back as raw text; a missing key is `None`. Parsing and
/// range checks belong to the loaders in `domain::config`, which reject
/// malformed values instead of defaulting them.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
