//! Line-oriented `key: value` reader for the agent configuration file.
//!
//! A key is recognised only at the start of a line (leading whitespace is
//! allowed) and must be followed by `:`. A key that merely ends with another
//! key's name, such as `insecure_tls`, is its own entry and never satisfies a
//! lookup for `tls`. Values stop at `#` or end of line. Keys are compared
//! ASCII case-insensitively and the first non-empty occurrence wins.

use std::collections::BTreeMap;

/// Typed mapping produced from `key: value` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    entries: BTreeMap<String, String>,
}

impl KeyValues {
    /// Parse line-oriented `key: value` text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let Some((key, value)) = split_entry(line) else {
                continue;
            };
            entries
                .entry(key.to_ascii_lowercase())
                .or_insert_with(|| value.to_string());
        }
        Self { entries }
    }

    /// Value recorded for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let (key, rest) = line.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() || !key.chars().all(is_key_char) {
        return None;
    }
    let value = rest.split('#').next().unwrap_or_default().trim();
    (!value.is_empty()).then_some((key, value))
}
