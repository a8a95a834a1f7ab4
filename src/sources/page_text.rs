//! Quotes scraped from free text on a news page
//!
//! Articles publish lines such as "Dólar blue Compra $1.470 Venta $1.490".
//! Each rule names a label; the first amount after the label is taken.

use serde::{Deserialize, Serialize};

use super::{HttpFetcher, QuoteSource};
use crate::html::page_text;
use crate::types::{RawValue, Result, UpstreamRecord};

/// Upstream name emitted for the amount following `label`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub upstream: String,
    pub label: String,
}

impl LabelRule {
    pub fn new(upstream: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            label: label.into(),
        }
    }
}

/// Find the amount text that follows `label` in `text`.
///
/// The label matches regardless of case, accented letters included. Between
/// label and amount the words "Compra"/"Venta" and a "$" sign may appear.
/// Occurrences of the label not followed by an amount are skipped.
pub fn find_labeled_amount(text: &str, label: &str) -> Option<String> {
    if label.is_empty() {
        return None;
    }
    text.char_indices().find_map(|(start, _)| {
        let len = label_prefix_len(&text[start..], label)?;
        amount_at(&text[start + len..])
    })
}

/// Byte length of the prefix of `text` equal to `label` ignoring case
fn label_prefix_len(text: &str, label: &str) -> Option<usize> {
    let mut chars = text.chars();
    let mut len = 0;
    for expected in label.chars() {
        let found = chars.next()?;
        if !expected.to_lowercase().eq(found.to_lowercase()) {
            return None;
        }
        len += found.len_utf8();
    }
    Some(len)
}

fn amount_at(rest: &str) -> Option<String> {
    let mut rest = rest.trim_start();
    for word in ["compra", "venta"] {
        if rest.len() >= word.len()
            && rest.is_char_boundary(word.len())
            && rest[..word.len()].eq_ignore_ascii_case(word)
        {
            rest = rest[word.len()..].trim_start();
            break;
        }
    }
    rest = rest.strip_prefix('$').unwrap_or(rest).trim_start();

    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(rest.len());
    let amount = rest[..end].trim_end_matches(['.', ',']);
    if amount.starts_with(|c: char| c.is_ascii_digit()) {
        Some(amount.to_string())
    } else {
        None
    }
}

/// Build a record from a page using label rules. Labels not found yield
/// [`RawValue::Missing`] so the aggregator keeps their fallback.
pub fn extract_record(html: &str, rules: &[LabelRule]) -> UpstreamRecord {
    let text = page_text(html);
    rules
        .iter()
        .map(|rule| {
            let value = find_labeled_amount(&text, &rule.label)
                .map(RawValue::Text)
                .unwrap_or(RawValue::Missing);
            (rule.upstream.clone(), value)
        })
        .collect()
}

/// Source scraping labeled amounts out of an HTML page
pub struct PageTextSource {
    name: String,
    url: String,
    rules: Vec<LabelRule>,
    http: HttpFetcher,
}

impl PageTextSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, rules: Vec<LabelRule>, http: HttpFetcher) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            rules,
            http,
        }
    }
}

impl QuoteSource for PageTextSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<UpstreamRecord> {
        let html = self.http.get_text(&self.url)?;
        Ok(extract_record(&html, &self.rules))
    }
}
