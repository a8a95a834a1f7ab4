//! Tolerant currency quote boards
//!
//! A board merges one live fetch (JSON API, scraped page or table) into a
//! table of last-known-good defaults. Whatever the upstream does, the result
//! has a value for every logical name.
//!
//! ```
//! use pizarra::services::Aggregator;
//! use pizarra::types::{FallbackTable, NameMap, PizarraError, UpstreamRecord};
//!
//! let fallback: FallbackTable = [("Official", 1030.50), ("Informal", 1485.00)]
//!     .into_iter()
//!     .collect();
//! let names: NameMap = [("Oficial", "Official"), ("Blue", "Informal")]
//!     .into_iter()
//!     .collect();
//!
//! let quotes = Aggregator::aggregate(&fallback, &names, || {
//!     Ok::<_, PizarraError>([("Oficial", 1040.0)].into_iter().collect::<UpstreamRecord>())
//! });
//! assert_eq!(quotes.get("Official"), Some(1040.0));
//! assert_eq!(quotes.get("Informal"), Some(1485.0));
//! ```

pub mod config;
pub mod html;
pub mod services;
pub mod sources;
pub mod types;
