//! Quote caching
//!
//! [`QuoteCache`] is the caller-owned `(value, fetched_at)` pair with an
//! explicit staleness check. [`QuoteCacheService`] persists one per board so
//! repeated CLI invocations within the TTL skip the network.

use chrono::{DateTime, Duration, Utc};
use directories::BaseDirs;
use fs2::FileExt;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::types::{FallbackTable, PizarraError, Provenance, QuoteSet, Result};

/// A quote set and the moment it was assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCache {
    pub fetched_at: DateTime<Utc>,
    pub quotes: QuoteSet,
    #[serde(default)]
    pub provenance: BTreeMap<String, Provenance>,
}

impl QuoteCache {
    pub fn new(
        quotes: QuoteSet,
        provenance: BTreeMap<String, Provenance>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            fetched_at,
            quotes,
            provenance,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.fetched_at)
    }

    /// Stale once `ttl` has elapsed. A timestamp in the future (clock change)
    /// also counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = self.age(now);
        age < Duration::zero() || age >= ttl
    }

    /// True when at least one value came from a live fetch
    pub fn has_live_values(&self) -> bool {
        self.provenance.values().any(|p| *p == Provenance::Live)
    }

    /// True when the cached quotes cover exactly the names of `fallback`
    pub fn covers(&self, fallback: &FallbackTable) -> bool {
        self.quotes.len() == fallback.len() && fallback.names().all(|n| self.quotes.contains(n))
    }
}

/// Whether a lookup was served from disk or refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Refreshed,
}

/// Persistent per-board quote cache
pub struct QuoteCacheService {
    cache_dir: PathBuf,
}

impl QuoteCacheService {
    /// Create a cache service with default cache directory (~/.pizarra/cache)
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| PizarraError::Cache("Cannot determine home directory".into()))?;
        let cache_dir = base_dirs.home_dir().join(".pizarra").join("cache");
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Create a cache service with a custom cache directory
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Get the cache file path for a board
    pub fn cache_path(&self, board: &str) -> PathBuf {
        self.cache_dir.join(format!("{}_quotes.json", board))
    }

    /// Load a board's cache. Missing or corrupted files yield `None`.
    pub fn load(&self, board: &str) -> Option<QuoteCache> {
        let path = self.cache_path(board);
        let mut file = OpenOptions::new().read(true).open(&path).ok()?;
        FileExt::lock_shared(&file).ok()?;

        let mut content = String::new();
        let read = file.read_to_string(&mut content);
        let _ = FileExt::unlock(&file);
        read.ok()?;

        match serde_json::from_str(&content) {
            Ok(cache) => Some(cache),
            Err(e) => {
                // Corrupted cache, start fresh
                warn!("ignoring corrupted cache {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save a board's cache under an exclusive lock
    pub fn save(&self, board: &str, cache: &QuoteCache) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let content = serde_json::to_string_pretty(cache)
            .map_err(|e| PizarraError::Cache(format!("Serialization failed: {}", e)))?;

        let path = self.cache_path(board);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;
        let written = file
            .set_len(0)
            .and_then(|_| file.write_all(content.as_bytes()))
            .and_then(|_| file.flush());
        FileExt::unlock(&file)?;
        written?;
        Ok(())
    }

    /// Clear cache for a board
    pub fn clear(&self, board: &str) -> Result<()> {
        let path = self.cache_path(board);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Return the cached quotes when fresh, otherwise call `refresh`.
    ///
    /// A cache whose names differ from `fallback` (the board config changed)
    /// counts as a miss. The refreshed result goes through
    /// [`QuoteCacheService::store`].
    pub fn load_or_refresh<F>(
        &self,
        board: &str,
        fallback: &FallbackTable,
        now: DateTime<Utc>,
        ttl: Duration,
        refresh: F,
    ) -> (QuoteCache, CacheStatus)
    where
        F: FnOnce() -> QuoteCache,
    {
        if let Some(cached) = self.load(board) {
            if !cached.covers(fallback) {
                info!("board {} cache does not match its fallback names, refreshing", board);
            } else if !cached.is_stale(now, ttl) {
                info!("board {} served from cache ({}s old)", board, cached.age(now).num_seconds());
                return (cached, CacheStatus::Hit);
            }
        }

        (self.store(board, refresh()), CacheStatus::Refreshed)
    }

    /// Persist `fresh` if it holds at least one live value, and return it.
    ///
    /// An outage never overwrites good data with fallbacks. Save failures
    /// are logged and do not affect the returned value.
    pub fn store(&self, board: &str, fresh: QuoteCache) -> QuoteCache {
        if fresh.has_live_values() {
            if let Err(e) = self.save(board, &fresh) {
                warn!("cache for {} failed: {}", board, e);
            }
        } else {
            info!("board {} has no live values, cache left untouched", board);
        }
        fresh
    }
}
