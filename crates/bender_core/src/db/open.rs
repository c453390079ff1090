//! Connection bootstrap for the posts store.
//!
//! # Invariants
//! - Returned connections have the configured schema attached.
//! - Returned connections have the posts table and title index in place.

use super::schema::ensure_posts_table;
use super::{DbError, DbResult};
use crate::config::StoreConfig;
use crate::query::quote_identifier;
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const IN_MEMORY: &str = ":memory:";

/// Opens the store described by `config` and bootstraps the posts table.
///
/// # Side effects
/// - Creates the database file, its parent directory and the attached schema
///   file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(config: &StoreConfig) -> DbResult<Connection> {
    config.validate()?;

    let started_at = Instant::now();
    let mode = if config.database_path.is_some() {
        "file"
    } else {
        "memory"
    };
    info!(
        "event=db_open module=db status=start mode={mode} schema={} table={}",
        config.schema, config.table
    );

    if let Some(path) = config.database_path.as_deref() {
        if let Err(err) = ensure_parent_dir(path) {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_dir_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    }

    let opened = match config.database_path.as_deref() {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn, config) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory store with default schema and table names.
pub fn open_store_in_memory() -> DbResult<Connection> {
    open_store(&StoreConfig::default())
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| DbError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn bootstrap_connection(conn: &Connection, config: &StoreConfig) -> DbResult<()> {
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

    if !config.uses_builtin_schema() {
        let target = attached_schema_location(config.database_path.as_deref(), &config.schema);
        conn.execute(
            &format!(
                "ATTACH DATABASE ?1 AS {};",
                quote_identifier(&config.schema)
            ),
            [target.as_str()],
        )?;
    }

    ensure_posts_table(conn, &config.schema, &config.table)?;
    Ok(())
}

/// File backing an attached schema: `<dir>/<schema>.sqlite3` next to the main
/// database, or a private in-memory database.
fn attached_schema_location(database_path: Option<&Path>, schema: &str) -> String {
    match database_path {
        Some(path) => {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let file: PathBuf = dir.join(format!("{schema}.sqlite3"));
            file.to_string_lossy().into_owned()
        }
        None => IN_MEMORY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::attached_schema_location;
    use std::path::Path;

    #[test]
    fn attached_schema_sits_next_to_main_database() {
        let location = attached_schema_location(Some(Path::new("/data/bender.db")), "blog");
        assert_eq!(location, "/data/blog.sqlite3");
    }

    #[test]
    fn attached_schema_is_in_memory_without_file() {
        assert_eq!(attached_schema_location(None, "blog"), ":memory:");
    }
}
