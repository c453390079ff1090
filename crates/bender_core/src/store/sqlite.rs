//! SQLite-backed executor.

use super::{Executor, Row, StoreError, StoreResult};
use crate::query::Statement;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Mutex, MutexGuard};

/// Executor owning one long-lived SQLite connection.
///
/// The connection is serialized behind a mutex so one executor can back a
/// service shared by many request threads.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    /// Wraps an opened, bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` with exclusive access to the underlying connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let conn = self.lock()?;
        f(&conn).map_err(StoreError::from)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::ConnectionPoisoned)
    }
}

impl Executor for SqliteExecutor {
    fn query(&self, statement: &Statement) -> StoreResult<Vec<Row>> {
        debug!(
            "event=statement_run module=store kind=query params={}",
            statement.params().len()
        );
        let conn = self.lock()?;
        let mut stmt = conn.prepare(statement.sql())?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = stmt.query(params_from_iter(statement.params()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (index, column) in columns.iter().enumerate() {
                record.insert(column.clone(), row.get::<_, Value>(index)?);
            }
            records.push(record);
        }

        Ok(records)
    }

    fn execute(&self, statement: &Statement) -> StoreResult<usize> {
        debug!(
            "event=statement_run module=store kind=execute params={}",
            statement.params().len()
        );
        let conn = self.lock()?;
        let changed = conn.execute(statement.sql(), params_from_iter(statement.params()))?;
        Ok(changed)
    }
}
