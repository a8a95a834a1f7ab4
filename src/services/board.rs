//! Boards: a source bound to its name map and fallback table

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::config::{BoardConfig, Config};
use crate::services::aggregator::{AggregationReport, Aggregator};
use crate::services::cache::QuoteCache;
use crate::sources::{self, HttpFetcher, QuoteSource};
use crate::types::{FallbackTable, NameMap, QuoteSet, Result};

/// Result of refreshing one board
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub board: String,
    pub quotes: QuoteSet,
    pub report: AggregationReport,
    pub fetched_at: DateTime<Utc>,
}

impl BoardSnapshot {
    pub fn into_cache(self) -> QuoteCache {
        QuoteCache::new(self.quotes, self.report.provenance, self.fetched_at)
    }
}

pub struct Board {
    name: String,
    source: Box<dyn QuoteSource>,
    name_map: NameMap,
    fallback: FallbackTable,
}

impl Board {
    pub fn new(
        name: impl Into<String>,
        source: Box<dyn QuoteSource>,
        name_map: NameMap,
        fallback: FallbackTable,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            name_map,
            fallback,
        }
    }

    fn from_config(config: &BoardConfig, http: &HttpFetcher) -> Self {
        Self::new(
            config.name.clone(),
            sources::from_config(&config.name, &config.source, http),
            config.name_map(),
            config.fallback_table(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn fallback(&self) -> &FallbackTable {
        &self.fallback
    }

    /// One aggregation pass. Never fails.
    pub fn refresh(&self) -> BoardSnapshot {
        let (quotes, report) =
            Aggregator::aggregate_source(self.source.as_ref(), &self.fallback, &self.name_map);
        BoardSnapshot {
            board: self.name.clone(),
            quotes,
            report,
            fetched_at: Utc::now(),
        }
    }
}

/// All configured boards
pub struct BoardRegistry {
    boards: Vec<Board>,
}

impl BoardRegistry {
    pub fn new(boards: Vec<Board>) -> Self {
        Self { boards }
    }

    /// Build every board in `config`, sharing one HTTP client
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpFetcher::new(config.timeout_ms, config.system_proxy)?;
        let boards = config
            .boards
            .iter()
            .map(|b| Board::from_config(b, &http))
            .collect();
        Ok(Self { boards })
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn get(&self, name: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.name == name)
    }

    /// Refresh every board in parallel; results keep registry order
    pub fn refresh_all(&self) -> Vec<BoardSnapshot> {
        self.boards.par_iter().map(Board::refresh).collect()
    }
}
