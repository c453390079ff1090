//! SQLite store bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the posts store.
//! - Ensure the posts table and its title index exist before first use.
//!
//! # Invariants
//! - Bootstrap DDL is idempotent; reopening an existing store changes nothing.
//! - Title uniqueness is also enforced by a store-level UNIQUE index.

use crate::config::ConfigError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{open_store, open_store_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Config(ConfigError),
    /// Creating the database's parent directory failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "cannot create directory {}: {source}", path.display())
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<ConfigError> for DbError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
