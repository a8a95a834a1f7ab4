//! Core types shared across pizarra

mod error;
mod quote;

pub use error::{PizarraError, Result};
pub use quote::{
    FallbackTable, NameMap, Provenance, QuoteSet, RawValue, UpstreamEntry, UpstreamRecord,
};
