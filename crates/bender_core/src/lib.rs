//! Data-access core for Bender blog posts.
//! This crate is the single source of truth for post invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod outcome;
pub mod query;
pub mod service;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use db::{open_store, open_store_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::post::{BlogPost, NewPost, PostChanges, PostId, PostRecord, POST_COLUMNS};
pub use outcome::{ErrorCode, Payload, QueryResult};
pub use query::{column_value_condition, select_statement, Condition, Statement};
pub use service::post_service::PostService;
pub use store::{Executor, Row, SqliteExecutor, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
