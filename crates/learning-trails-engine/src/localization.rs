//! String-table lookup for localizable trail content.

use std::collections::HashMap;

use serde::Deserialize;

/// Looks up a replacement for localizable content by key.
pub trait Localizer {
    /// Returns the localized string for `key`, or `default_value` when the
    /// table has no entry.
    fn localized_string(&self, key: &str, default_value: &str) -> String;
}

/// In-memory string table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StringTable {
    #[serde(default)]
    strings: HashMap<String, String>,
}

impl StringTable {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            strings: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses a TOML document with a `[strings]` table.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Localizer for StringTable {
    fn localized_string(&self, key: &str, default_value: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| default_value.to_string())
    }
}
