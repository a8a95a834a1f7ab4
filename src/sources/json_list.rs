//! JSON list endpoints (dolarapi.com style)

use log::debug;
use serde::{Deserialize, Serialize};

use super::{HttpFetcher, QuoteSource};
use crate::types::{PizarraError, RawValue, Result, UpstreamRecord};

/// Default endpoint: every dollar quote published by dolarapi.com
pub const DOLARAPI_URL: &str = "https://dolarapi.com/v1/dolares";

/// Which object fields carry the upstream name and the value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFields {
    pub name_field: String,
    pub value_field: String,
}

impl Default for ListFields {
    fn default() -> Self {
        Self {
            name_field: "nombre".to_string(),
            value_field: "venta".to_string(),
        }
    }
}

/// Decode a JSON payload into upstream entries.
///
/// Accepts an array of objects or a single object. Objects without a string
/// name field are skipped; a missing value field becomes [`RawValue::Missing`].
pub fn decode_list(bytes: &mut [u8], fields: &ListFields) -> Result<UpstreamRecord> {
    let payload: serde_json::Value = simd_json::from_slice(bytes)?;

    let items = match payload {
        serde_json::Value::Array(items) => items,
        obj @ serde_json::Value::Object(_) => vec![obj],
        other => {
            return Err(PizarraError::Decode(format!(
                "expected array or object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut record = UpstreamRecord::new();
    for item in &items {
        let Some(obj) = item.as_object() else {
            debug!("skipping non-object list item");
            continue;
        };
        let Some(name) = obj.get(&fields.name_field).and_then(|v| v.as_str()) else {
            debug!("skipping item without {:?}", fields.name_field);
            continue;
        };
        let value = obj
            .get(&fields.value_field)
            .map(RawValue::from_json)
            .unwrap_or(RawValue::Missing);
        record.push(name, value);
    }

    Ok(record)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Source backed by a REST endpoint returning a JSON list
pub struct JsonListSource {
    name: String,
    url: String,
    fields: ListFields,
    http: HttpFetcher,
}

impl JsonListSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, fields: ListFields, http: HttpFetcher) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fields,
            http,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl QuoteSource for JsonListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<UpstreamRecord> {
        let mut body = self.http.get_bytes(&self.url)?;
        decode_list(&mut body, &self.fields)
    }
}
