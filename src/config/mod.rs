//! Board configuration
//!
//! Read from `~/.pizarra/config.json` (or an explicit path). Without a file
//! the built-in `dolares` board is used.

pub mod defaults;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::sources::{LabelRule, DOLARAPI_URL};
use crate::types::{FallbackTable, NameMap, PizarraError, Result};

use defaults::{
    default_fallback, default_name_map, DEFAULT_BOARD, DEFAULT_CACHE_TTL_SECS, DEFAULT_TIMEOUT_MS,
};

const MAX_TIMEOUT_MS: u64 = 60_000;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for network sources
    pub timeout_ms: u64,
    /// How long a cached board stays fresh
    pub cache_ttl_secs: u64,
    /// Honor proxy settings from the environment
    pub system_proxy: bool,
    pub boards: Vec<BoardConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            system_proxy: true,
            boards: vec![BoardConfig::default_dolares()],
        }
    }
}

/// One board: a source, its name map and its fallback table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub name_map: BTreeMap<String, String>,
    pub fallback: BTreeMap<String, f64>,
}

impl BoardConfig {
    pub fn default_dolares() -> Self {
        Self {
            name: DEFAULT_BOARD.to_string(),
            source: SourceConfig::JsonList {
                url: DOLARAPI_URL.to_string(),
                name_field: default_name_field(),
                value_field: default_value_field(),
            },
            name_map: default_name_map(),
            fallback: default_fallback(),
        }
    }

    pub fn fallback_table(&self) -> FallbackTable {
        FallbackTable::from(self.fallback.clone())
    }

    pub fn name_map(&self) -> NameMap {
        self.name_map.iter().collect()
    }
}

/// Where a board gets its upstream record from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    JsonList {
        url: String,
        #[serde(default = "default_name_field")]
        name_field: String,
        #[serde(default = "default_value_field")]
        value_field: String,
    },
    PageText {
        url: String,
        labels: Vec<LabelRule>,
    },
    HtmlTable {
        url: String,
        name_column: String,
        value_column: String,
    },
    File {
        path: PathBuf,
        #[serde(default = "default_name_field")]
        name_field: String,
        #[serde(default = "default_value_field")]
        value_field: String,
    },
}

fn default_name_field() -> String {
    "nombre".to_string()
}

fn default_value_field() -> String {
    "venta".to_string()
}

impl Config {
    /// Default config location (~/.pizarra/config.json)
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.home_dir().join(".pizarra").join("config.json"))
    }

    /// Load from `path`, or from the default location if it exists, or fall
    /// back to built-in defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PizarraError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PizarraError::Config(format!("Invalid config: {}", e)))
    }

    /// Check invariants the rest of the crate relies on
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(PizarraError::Config(format!(
                "timeout_ms must be in 1..={}, got {}",
                MAX_TIMEOUT_MS, self.timeout_ms
            )));
        }
        if self.boards.is_empty() {
            return Err(PizarraError::Config("at least one board is required".into()));
        }

        let mut seen = HashSet::new();
        for board in &self.boards {
            if board.name.is_empty()
                || !board
                    .name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(PizarraError::Config(format!(
                    "board name {:?} must be non-empty ASCII letters, digits, '-' or '_'",
                    board.name
                )));
            }
            if !seen.insert(board.name.as_str()) {
                return Err(PizarraError::Config(format!(
                    "duplicate board name {:?}",
                    board.name
                )));
            }
            if board.fallback.is_empty() {
                return Err(PizarraError::Config(format!(
                    "board {:?} has an empty fallback table",
                    board.name
                )));
            }
            if let Some((logical, _)) = board.fallback.iter().find(|(_, v)| !v.is_finite()) {
                return Err(PizarraError::Config(format!(
                    "board {:?} has a non-finite fallback for {:?}",
                    board.name, logical
                )));
            }
            for (upstream, logical) in &board.name_map {
                if !board.fallback.contains_key(logical) {
                    warn!(
                        "board {:?}: {:?} maps to {:?}, which has no fallback and will be ignored",
                        board.name, upstream, logical
                    );
                }
            }
        }
        Ok(())
    }

    pub fn board(&self, name: &str) -> Option<&BoardConfig> {
        self.boards.iter().find(|b| b.name == name)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.boards.len(), 1);
        assert_eq!(config.boards[0].name, "dolares");
        assert_eq!(config.boards[0].fallback.len(), 5);
    }

    #[test]
    fn test_default_name_map_targets_exist_in_fallback() {
        let board = &Config::default().boards[0];
        for logical in board.name_map.values() {
            assert!(board.fallback.contains_key(logical), "{}", logical);
        }
    }

    #[test]
    fn test_parse_minimal_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"timeout_ms": 2000}"#).unwrap();
        assert_eq!(config.timeout_ms, 2000);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.boards[0].name, "dolares");
    }

    #[test]
    fn test_parse_all_source_kinds() {
        let json = r#"{
            "boards": [
                {"name": "api", "source": {"kind": "json_list", "url": "https://x/v1"},
                 "fallback": {"Official": 1.0}},
                {"name": "nota", "source": {"kind": "page_text", "url": "https://x/nota",
                   "labels": [{"upstream": "Blue", "label": "Dólar blue"}]},
                 "name_map": {"Blue": "Informal"}, "fallback": {"Informal": 2.0}},
                {"name": "tabla", "source": {"kind": "html_table", "url": "https://x/t",
                   "name_column": "casa", "value_column": "venta"},
                 "fallback": {"Official": 3.0}},
                {"name": "local", "source": {"kind": "file", "path": "/tmp/q.json",
                   "value_field": "compra"},
                 "fallback": {"Official": 4.0}}
            ]
        }"#;
        let config = Config::from_json_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.boards.len(), 4);

        assert!(matches!(
            &config.boards[0].source,
            SourceConfig::JsonList { name_field, value_field, .. }
                if name_field == "nombre" && value_field == "venta"
        ));
        assert!(matches!(
            &config.boards[1].source,
            SourceConfig::PageText { labels, .. } if labels[0].label == "Dólar blue"
        ));
        assert!(matches!(
            &config.boards[3].source,
            SourceConfig::File { value_field, .. } if value_field == "compra"
        ));
    }

    #[test]
    fn test_unknown_source_kind_rejected() {
        let json = r#"{"boards": [{"name": "x", "source": {"kind": "ftp"}, "fallback": {"A": 1}}]}"#;
        assert!(matches!(
            Config::from_json_str(json),
            Err(PizarraError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_timeout() {
        let config = Config {
            timeout_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            timeout_ms: 120_000,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_no_boards() {
        let config = Config {
            boards: vec![],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_boards() {
        let board = BoardConfig::default_dolares();
        let config = Config {
            boards: vec![board.clone(), board],
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_empty_fallback() {
        let mut board = BoardConfig::default_dolares();
        board.fallback.clear();
        let config = Config {
            boards: vec![board],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_path_like_board_name() {
        for name in ["", "../etc", "mis dolares"] {
            let mut board = BoardConfig::default_dolares();
            board.name = name.to_string();
            let config = Config {
                boards: vec![board],
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{:?}", name);
        }
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let config = Config {
            cache_ttl_secs: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.cache_ttl(), chrono::Duration::MAX);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"cache_ttl_secs": 60}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.cache_ttl(), chrono::Duration::seconds(60));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/config.json")));
        assert!(matches!(result, Err(PizarraError::Config(_))));
    }

    #[test]
    fn test_board_lookup() {
        let config = Config::default();
        assert!(config.board("dolares").is_some());
        assert!(config.board("euros").is_none());
    }

    #[test]
    fn test_board_tables() {
        let board = BoardConfig::default_dolares();
        let fallback = board.fallback_table();
        let map = board.name_map();
        assert_eq!(fallback.get("Official"), Some(1030.50));
        assert_eq!(map.resolve("contado con liquidación"), Some("StockExchangeEquivalent"));
    }
}
