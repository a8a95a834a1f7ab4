//! Quote board data model

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::services::normalizer::{normalize_name, parse_amount};

/// Complete set of named reference values produced by one aggregation.
///
/// Keys are logical names ("Official", "Informal", ...), values are currency
/// units per unit of the foreign reference currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteSet(BTreeMap<String, f64>);

impl QuoteSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Logical names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Overwrite an existing entry. Unknown names are rejected so the key set
    /// never grows past the fallback it was seeded from.
    pub(crate) fn overwrite(&mut self, name: &str, value: f64) -> bool {
        match self.0.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl From<&FallbackTable> for QuoteSet {
    fn from(fallback: &FallbackTable) -> Self {
        Self(fallback.0.clone())
    }
}

/// Last-known-good defaults, one per logical name.
///
/// Owned by the caller and never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackTable(BTreeMap<String, f64>);

impl FallbackTable {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FallbackTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<BTreeMap<String, f64>> for FallbackTable {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}

/// Translation from upstream names to logical names.
///
/// Lookups ignore case and extra whitespace, so "Contado con Liquidación" and
/// "contado con  liquidación" resolve to the same logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: HashMap<String, String>,
}

impl NameMap {
    /// Resolve an upstream name to its logical name
    pub fn resolve(&self, upstream: &str) -> Option<&str> {
        self.entries
            .get(&normalize_name(upstream))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logical names this map can produce
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (normalize_name(k.as_ref()), v.into()))
                .collect(),
        }
    }
}

/// Untrusted value as decoded from an upstream payload
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    /// Text as scraped or sent by the upstream, e.g. "$ 1.485,50"
    Text(String),
    Missing,
}

impl RawValue {
    /// Interpret the value as an amount. Non-finite numbers are rejected.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(text) => parse_amount(text),
            Self::Missing => None,
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Missing,
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Missing),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One (name, value) pair in upstream naming
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamEntry {
    pub name: String,
    pub value: RawValue,
}

/// Ordered entries returned by a source fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamRecord {
    entries: Vec<UpstreamEntry>,
}

impl UpstreamRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.push(UpstreamEntry {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn entries(&self) -> &[UpstreamEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<RawValue>> FromIterator<(N, V)> for UpstreamRecord {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.push(name, value);
        }
        record
    }
}

/// Where a value in a [`QuoteSet`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Fallback,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}
