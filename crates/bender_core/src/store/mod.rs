//! Statement execution against the backing store.
//!
//! # Responsibility
//! - Define the executor seam consumed by the record service.
//! - Keep connection handling out of service orchestration.
//!
//! # Invariants
//! - Executors either return rows/affected counts or an error; they never
//!   classify outcomes into service error codes.

use crate::query::Statement;
use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteExecutor;

/// One result row keyed by column name.
pub type Row = BTreeMap<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Execution failure raised by an [`Executor`].
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// A previous holder of the connection panicked.
    ConnectionPoisoned,
    /// A returned row could not be decoded.
    InvalidData(String),
}

impl StoreError {
    /// Returns whether this error is a UNIQUE constraint violation on
    /// `column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, message)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && message
                        .as_deref()
                        .is_some_and(|text| text.ends_with(&format!(".{column}")))
            }
            _ => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::ConnectionPoisoned => write!(f, "store connection lock is poisoned"),
            Self::InvalidData(message) => write!(f, "invalid row data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::ConnectionPoisoned => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Runs built statements.
///
/// Implementations must be shareable across request threads; the service
/// holds exactly one executor for its whole lifetime.
pub trait Executor: Send + Sync {
    /// Runs a row-returning statement.
    fn query(&self, statement: &Statement) -> StoreResult<Vec<Row>>;
    /// Runs a mutating statement and returns the number of affected rows.
    fn execute(&self, statement: &Statement) -> StoreResult<usize>;
}
