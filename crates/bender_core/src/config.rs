//! Store connection configuration.
//!
//! # Responsibility
//! - Load the JSON connection config used at process bootstrap.
//! - Validate schema/table identifiers before they reach SQL generation.
//!
//! # Invariants
//! - A missing config file is a distinct error (`NotFound`), never defaulted.
//! - `schema` and `table` always match `^[A-Za-z_][A-Za-z0-9_]*$` after
//!   `validate()`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA: &str = "main";
pub const DEFAULT_TABLE: &str = "blog_table";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(
                f,
                "database connection config file not found: {}",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed connection config: {err}"),
            Self::Invalid(message) => write!(f, "invalid connection config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::NotFound(_) | Self::Invalid(_) => None,
        }
    }
}

/// Connection settings for the posts store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file path. `None` opens an in-memory store.
    pub database_path: Option<PathBuf>,
    /// Schema that qualifies every statement. Non-`main` schemas are attached.
    pub schema: String,
    pub table: String,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Reads and validates a JSON config file.
    ///
    /// Unknown keys are ignored so connection files shared with other tools
    /// still load.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !is_identifier(&self.schema) {
            return Err(ConfigError::Invalid(format!(
                "schema `{}` is not a plain identifier",
                self.schema
            )));
        }
        if !is_identifier(&self.table) {
            return Err(ConfigError::Invalid(format!(
                "table `{}` is not a plain identifier",
                self.table
            )));
        }
        Ok(())
    }

    /// Returns whether `schema` is one SQLite provides without ATTACH.
    pub fn uses_builtin_schema(&self) -> bool {
        self.schema.eq_ignore_ascii_case("main") || self.schema.eq_ignore_ascii_case("temp")
    }
}

fn is_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_SCHEMA, DEFAULT_TABLE};

    #[test]
    fn empty_document_uses_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.schema, DEFAULT_SCHEMA);
        assert_eq!(config.table, DEFAULT_TABLE);
        assert!(config.uses_builtin_schema());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = StoreConfig::from_json_str(
            r#"{"host": "localhost", "user": "bender", "schema": "blog"}"#,
        )
        .unwrap();
        assert_eq!(config.schema, "blog");
        assert!(!config.uses_builtin_schema());
    }

    #[test]
    fn rejects_non_identifier_table() {
        let err = StoreConfig::from_json_str(r#"{"table": "posts; DROP TABLE x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = StoreConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
