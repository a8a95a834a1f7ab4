//! Tolerant quote aggregation
//!
//! Merges one live fetch into a copy of the fallback table. The fetch is the
//! only fallible step and its failure is the single recovery point: whatever
//! goes wrong, the caller gets a quote set with every fallback key present.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};

use crate::sources::QuoteSource;
use crate::types::{
    FallbackTable, NameMap, PizarraError, Provenance, QuoteSet, UpstreamRecord,
};

/// Why a whole fetch was discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDiagnostic {
    /// Connect failure, timeout, non-2xx status
    Transport(String),
    /// Payload not parseable as the expected structure
    Decode(String),
    /// Any other failure reported by the fetch
    Other(String),
}

impl fmt::Display for FetchDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport failure: {}", msg),
            Self::Decode(msg) => write!(f, "decode failure: {}", msg),
            Self::Other(msg) => write!(f, "fetch failure: {}", msg),
        }
    }
}

impl From<PizarraError> for FetchDiagnostic {
    fn from(err: PizarraError) -> Self {
        match err {
            PizarraError::Transport(msg) => Self::Transport(msg),
            PizarraError::Decode(msg) => Self::Decode(msg),
            PizarraError::Json(e) => Self::Decode(e.to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FetchDiagnostic {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for FetchDiagnostic {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Why a single upstream entry did not refresh a value
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDiagnostic {
    /// Upstream name has no mapping
    Unmapped { name: String },
    /// Mapping points at a logical name the fallback does not have
    UnknownTarget { name: String, target: String },
    /// Value present but not a valid number
    NotNumeric { name: String, raw: String },
}

impl fmt::Display for EntryDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmapped { name } => write!(f, "unmapped upstream name {:?}", name),
            Self::UnknownTarget { name, target } => write!(
                f,
                "upstream {:?} maps to {:?}, which has no fallback",
                name, target
            ),
            Self::NotNumeric { name, raw } => {
                write!(f, "upstream {:?} has non-numeric value {}", name, raw)
            }
        }
    }
}

/// Side channel describing how a quote set was assembled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationReport {
    /// Provenance for every logical name in the result
    pub provenance: BTreeMap<String, Provenance>,
    /// Set when the fetch itself failed
    pub fetch_failure: Option<FetchDiagnostic>,
    /// Entries that were read but did not refresh anything
    pub skipped: Vec<EntryDiagnostic>,
}

impl AggregationReport {
    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.provenance.get(name).copied()
    }

    /// Number of names refreshed from the live fetch
    pub fn live_count(&self) -> usize {
        self.provenance
            .values()
            .filter(|p| **p == Provenance::Live)
            .count()
    }

    pub fn is_fully_live(&self) -> bool {
        self.live_count() == self.provenance.len()
    }

    /// Logical names still holding their fallback value
    pub fn stale_names(&self) -> Vec<&str> {
        self.provenance
            .iter()
            .filter(|(_, p)| **p == Provenance::Fallback)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Quote aggregation entry points
pub struct Aggregator;

impl Aggregator {
    /// Build a complete quote set from `fallback`, refreshed by one `fetch`.
    ///
    /// Never fails: a failed fetch returns a copy of `fallback`, and entries
    /// that are unmapped or non-numeric leave their logical name untouched.
    ///
    /// # Panics
    ///
    /// Only `Err` results are recovered. If `fetch` panics, the panic
    /// propagates to the caller.
    pub fn aggregate<F, E>(fallback: &FallbackTable, name_map: &NameMap, fetch: F) -> QuoteSet
    where
        F: FnOnce() -> Result<UpstreamRecord, E>,
        E: Into<FetchDiagnostic>,
    {
        Self::aggregate_with_report(fallback, name_map, fetch).0
    }

    /// Same as [`Aggregator::aggregate`], also returning how each value was obtained.
    pub fn aggregate_with_report<F, E>(
        fallback: &FallbackTable,
        name_map: &NameMap,
        fetch: F,
    ) -> (QuoteSet, AggregationReport)
    where
        F: FnOnce() -> Result<UpstreamRecord, E>,
        E: Into<FetchDiagnostic>,
    {
        let mut result = QuoteSet::from(fallback);
        let mut report = AggregationReport {
            provenance: fallback
                .names()
                .map(|name| (name.to_string(), Provenance::Fallback))
                .collect(),
            ..Default::default()
        };

        let record = match fetch() {
            Ok(record) => record,
            Err(err) => {
                let diagnostic: FetchDiagnostic = err.into();
                warn!("quote fetch failed, using fallback values: {}", diagnostic);
                report.fetch_failure = Some(diagnostic);
                return (result, report);
            }
        };

        for entry in record.entries() {
            let Some(target) = name_map.resolve(&entry.name) else {
                report.skipped.push(EntryDiagnostic::Unmapped {
                    name: entry.name.clone(),
                });
                continue;
            };

            if !result.contains(target) {
                report.skipped.push(EntryDiagnostic::UnknownTarget {
                    name: entry.name.clone(),
                    target: target.to_string(),
                });
                continue;
            }

            match entry.value.as_amount() {
                Some(value) => {
                    result.overwrite(target, value);
                    report
                        .provenance
                        .insert(target.to_string(), Provenance::Live);
                }
                None => report.skipped.push(EntryDiagnostic::NotNumeric {
                    name: entry.name.clone(),
                    raw: entry.value.to_string(),
                }),
            }
        }

        for skipped in &report.skipped {
            debug!("skipped upstream entry: {}", skipped);
        }
        let stale = report.stale_names();
        if !stale.is_empty() {
            warn!("no live value for {}, using fallback", stale.join(", "));
        }

        (result, report)
    }

    /// Aggregate using a [`QuoteSource`] as the fetch
    pub fn aggregate_source(
        source: &dyn QuoteSource,
        fallback: &FallbackTable,
        name_map: &NameMap,
    ) -> (QuoteSet, AggregationReport) {
        debug!("fetching quotes from {}", source.name());
        Self::aggregate_with_report(fallback, name_map, || source.fetch())
    }
}
