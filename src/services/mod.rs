//! Services for aggregation, caching, history and inflation

pub mod aggregator;
pub mod board;
pub mod cache;
pub mod history;
pub mod inflation;
pub mod normalizer;

pub use aggregator::{AggregationReport, Aggregator, EntryDiagnostic, FetchDiagnostic};
pub use board::{Board, BoardRegistry, BoardSnapshot};
pub use cache::{CacheStatus, QuoteCache, QuoteCacheService};
pub use history::{month_end_closes, observations_from_tables, MonthEndClose};
pub use inflation::{inflation_from_tables, MonthlyInflation};
