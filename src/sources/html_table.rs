//! Quotes read from an HTML table

use serde::{Deserialize, Serialize};

use super::{HttpFetcher, QuoteSource};
use crate::html::tables;
use crate::types::{PizarraError, RawValue, Result, UpstreamRecord};

/// Header names (case-insensitive substrings) of the name and value columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    pub name_column: String,
    pub value_column: String,
}

/// Build a record from the first table having both columns.
///
/// Rows with an empty name cell are skipped; a short row yields
/// [`RawValue::Missing`] for its value.
pub fn extract_record(html: &str, columns: &TableColumns) -> Result<UpstreamRecord> {
    let found = tables(html);
    let (table, name_idx, value_idx) = found
        .iter()
        .find_map(|t| Some((t, t.column(&columns.name_column)?, t.column(&columns.value_column)?)))
        .ok_or_else(|| {
            PizarraError::Decode(format!(
                "no table with columns {:?} and {:?} ({} tables on page)",
                columns.name_column,
                columns.value_column,
                found.len()
            ))
        })?;

    let mut record = UpstreamRecord::new();
    for row in &table.rows {
        let Some(name) = row.get(name_idx).filter(|n| !n.is_empty()) else {
            continue;
        };
        let value = row
            .get(value_idx)
            .map(|v| RawValue::Text(v.clone()))
            .unwrap_or(RawValue::Missing);
        record.push(name.as_str(), value);
    }
    Ok(record)
}

/// Source reading rows of an HTML table
pub struct HtmlTableSource {
    name: String,
    url: String,
    columns: TableColumns,
    http: HttpFetcher,
}

impl HtmlTableSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, columns: TableColumns, http: HttpFetcher) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            columns,
            http,
        }
    }
}

impl QuoteSource for HtmlTableSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<UpstreamRecord> {
        let html = self.http.get_text(&self.url)?;
        extract_record(&html, &self.columns)
    }
}
