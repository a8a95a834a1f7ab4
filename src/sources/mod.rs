//! Quote sources: the fallible fetch half of aggregation

pub mod file;
pub mod html_table;
pub mod http;
pub mod json_list;
pub mod page_text;

pub use file::FileSource;
pub use html_table::{HtmlTableSource, TableColumns};
pub use http::HttpFetcher;
pub use json_list::{JsonListSource, ListFields, DOLARAPI_URL};
pub use page_text::{LabelRule, PageTextSource};

use crate::config::SourceConfig;
use crate::types::{Result, UpstreamRecord};

/// Trait for anything that can produce an upstream record
pub trait QuoteSource: Send + Sync {
    /// Source identifier (used in logs)
    fn name(&self) -> &str;

    /// Perform one fetch. Single attempt, no retry.
    fn fetch(&self) -> Result<UpstreamRecord>;
}

/// Build the source described by `config` for board `board`
pub fn from_config(board: &str, config: &SourceConfig, http: &HttpFetcher) -> Box<dyn QuoteSource> {
    match config {
        SourceConfig::JsonList {
            url,
            name_field,
            value_field,
        } => Box::new(JsonListSource::new(
            board,
            url.as_str(),
            ListFields {
                name_field: name_field.clone(),
                value_field: value_field.clone(),
            },
            http.clone(),
        )),
        SourceConfig::PageText { url, labels } => Box::new(PageTextSource::new(
            board,
            url.as_str(),
            labels.clone(),
            http.clone(),
        )),
        SourceConfig::HtmlTable {
            url,
            name_column,
            value_column,
        } => Box::new(HtmlTableSource::new(
            board,
            url.as_str(),
            TableColumns {
                name_column: name_column.clone(),
                value_column: value_column.clone(),
            },
            http.clone(),
        )),
        SourceConfig::File {
            path,
            name_field,
            value_field,
        } => Box::new(FileSource::new(
            board,
            path.clone(),
            ListFields {
                name_field: name_field.clone(),
                value_field: value_field.clone(),
            },
        )),
    }
}
