//! Local JSON file source, same shape as the JSON list endpoints

use std::fs;
use std::path::{Path, PathBuf};

use super::json_list::{decode_list, ListFields};
use super::QuoteSource;
use crate::types::{Result, UpstreamRecord};

pub struct FileSource {
    name: String,
    path: PathBuf,
    fields: ListFields,
}

impl FileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, fields: ListFields) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            fields,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuoteSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<UpstreamRecord> {
        let mut content = fs::read(&self.path)?;
        decode_list(&mut content, &self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PizarraError;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dolares.json");
        fs::write(&path, r#"[{"nombre":"Oficial","venta":1040.0}]"#).unwrap();

        let source = FileSource::new("local", &path, ListFields::default());
        let record = source.fetch().unwrap();

        assert_eq!(source.name(), "local");
        assert_eq!(record.len(), 1);
        assert_eq!(record.entries()[0].value.as_amount(), Some(1040.0));
    }

    #[test]
    fn test_fetch_missing_file() {
        let source = FileSource::new("local", "/nonexistent/dolares.json", ListFields::default());
        assert!(matches!(source.fetch(), Err(PizarraError::Io(_))));
    }
}
