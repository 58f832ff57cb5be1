//! String-keyed persisted state.
//!
//! The engine only needs get/set by key; how values reach disk is up to the
//! implementation. [`MemoryStore`] is the in-process map, and
//! [`crate::io::FileStore`] persists one as TOML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    Dictionary(BTreeMap<String, StoreValue>),
}

impl StoreValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoreValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoreValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, StoreValue>> {
        match self {
            StoreValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<StoreValue>;
    fn set(&mut self, key: &str, value: StoreValue);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    values: BTreeMap<String, StoreValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<StoreValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: StoreValue) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("a", StoreValue::Integer(3));
        assert_eq!(store.get("a").and_then(|v| v.as_integer()), Some(3));
        store.remove("a");
        assert!(store.get("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn accessors_reject_other_variants() {
        let value = StoreValue::Text("x".into());
        assert_eq!(value.as_bool(), None);
        assert_eq!(value.as_integer(), None);
        assert!(value.as_dictionary().is_none());
    }
}
