//! Minimal HTML extraction: page text and tables
//!
//! Quote pages are small and loosely formed, so this works on plain string
//! slicing. Tag matching is ASCII case-insensitive; lowercasing with
//! `to_ascii_lowercase` keeps byte offsets identical between the lowered copy
//! and the original, which is what makes slicing the original safe.
//! Nested tables are not supported.

/// A table as found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Index of the first header containing `name` (case-insensitive)
    pub fn column(&self, name: &str) -> Option<usize> {
        let needle = name.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&needle))
    }

    /// Cell at (`row`, `col`) if present
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Flatten a page to whitespace-normalized text, dropping scripts and styles.
pub fn page_text(html: &str) -> String {
    let without_scripts = remove_elements(html, "script");
    let cleaned = remove_elements(&without_scripts, "style");
    strip_tags(&cleaned)
}

/// Every `<table>` on the page, in document order
pub fn tables(html: &str) -> Vec<HtmlTable> {
    elements(html, "table")
        .into_iter()
        .map(parse_table)
        .collect()
}

fn parse_table(inner: &str) -> HtmlTable {
    let mut headers: Vec<String> = elements(inner, "thead")
        .first()
        .map(|head| elements(head, "th").into_iter().map(strip_tags).collect())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for tr in elements(inner, "tr") {
        if elements(tr, "td").is_empty() {
            if headers.is_empty() {
                headers = elements(tr, "th").into_iter().map(strip_tags).collect();
            }
            continue;
        }
        // Row labels are often marked up as <th>; keep them in column order
        rows.push(
            elements_any(tr, &["th", "td"])
                .into_iter()
                .map(strip_tags)
                .collect(),
        );
    }

    HtmlTable { headers, rows }
}

/// Inner content of each `<tag ...>...</tag>` block, outermost first.
fn elements<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    elements_any(s, &[tag])
}

/// Like [`elements`], for blocks of any of `tags`, in document order.
fn elements_any<'a>(s: &'a str, tags: &[&str]) -> Vec<&'a str> {
    let lower = s.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut from = 0;

    while let Some((start, tag)) = next_open(&lower, from, tags) {
        let name_end = start + 1 + tag.len();
        let Some(gt) = lower[name_end..].find('>') else {
            break;
        };
        let content_start = name_end + gt + 1;
        let close = format!("</{}>", tag);
        match lower[content_start..].find(&close) {
            Some(end_rel) => {
                let content_end = content_start + end_rel;
                out.push(&s[content_start..content_end]);
                from = content_end + close.len();
            }
            None => {
                out.push(&s[content_start..]);
                break;
            }
        }
    }

    out
}

/// Earliest opening tag among `tags` at or after `from`
fn next_open<'t>(lower: &str, from: usize, tags: &[&'t str]) -> Option<(usize, &'t str)> {
    tags.iter()
        .filter_map(|tag| find_open(lower, from, tag).map(|pos| (pos, *tag)))
        .min_by_key(|(pos, _)| *pos)
}

fn find_open(lower: &str, mut from: usize, tag: &str) -> Option<usize> {
    let open = format!("<{}", tag);
    while let Some(rel) = lower[from..].find(&open) {
        let start = from + rel;
        let name_end = start + open.len();
        match lower[name_end..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => return Some(start),
            // e.g. "<th" matching "<thead"
            _ => from = name_end,
        }
    }
    None
}

/// Drop every `<tag>...</tag>` block including its content
fn remove_elements(s: &str, tag: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut out = String::with_capacity(s.len());
    let mut from = 0;

    while let Some(rel) = lower[from..].find(&open) {
        let start = from + rel;
        out.push_str(&s[from..start]);
        match lower[start..].find(&close) {
            Some(end_rel) => from = start + end_rel + close.len(),
            None => {
                from = s.len();
                break;
            }
        }
    }
    out.push_str(&s[from..]);
    out
}

/// Replace tags with spaces, decode entities and normalize whitespace
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
