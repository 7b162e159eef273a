//! Flattened values and the ordered key map they live in.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::keys::ARRAY_LABEL;

/// The value stored under a flattened key.
#[derive(Clone, Debug, PartialEq)]
pub enum FlatValue {
    /// A leaf value taken from the document.
    Scalar(Value),
    /// A complex setting whose children were flattened under derived keys.
    Array,
}

impl FlatValue {
    /// A JSON null scalar.
    pub fn null() -> Self {
        Self::Scalar(Value::Null)
    }

    /// A string scalar.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Scalar(Value::String(s.into()))
    }

    /// Returns `true` for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Value::Null))
    }

    /// The string content, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for FlatValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl fmt::Display for FlatValue {
    /// Strings render verbatim, null renders empty, other scalars as compact
    /// JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array => f.write_str(ARRAY_LABEL),
            Self::Scalar(value) => write_scalar(f, value),
        }
    }
}

impl Serialize for FlatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Array => serializer.serialize_str(ARRAY_LABEL),
            Self::Scalar(value) => value.serialize(serializer),
        }
    }
}

/// Render a JSON scalar the way report cells show it.
pub fn write_scalar(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::String(s) => f.write_str(s),
        other => write!(f, "{other}"),
    }
}

/// An insertion-ordered map from flattened key to [`FlatValue`].
///
/// Inserting a key that already exists replaces its value and keeps its
/// original position.
#[derive(Clone, Debug, Default)]
pub struct FlatMap {
    entries: Vec<(String, FlatValue)>,
    index: HashMap<String, usize>,
}

impl FlatMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: FlatValue) -> Option<FlatValue> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&FlatValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlatValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` into `self`, in order.
    pub fn extend(&mut self, other: FlatMap) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &FlatValue) -> bool) {
        self.entries.retain(|(k, v)| keep(k, v));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, (k, _))| (k.clone(), pos))
            .collect();
    }
}

impl PartialEq for FlatMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>> FromIterator<(K, FlatValue)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (K, FlatValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for FlatMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
