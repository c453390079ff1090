//! Blog post record service.
//!
//! # Responsibility
//! - Check existence/uniqueness invariants before mutating the store.
//! - Stamp `created_time`/`updated_time`.
//! - Convert every outcome into a [`QueryResult`].
//!
//! # Invariants
//! - Execution errors are converted only in `execute_with_try`; no operation
//!   returns `Err` or panics on store failure.
//! - `NOEXIST`/`DUPTITLE` detected by a probe short-circuit before the
//!   mutating statement runs.
//! - A probe that fails is reported as `DBERR`, never as "absent".
//!
//! Probes and mutations are separate round trips with no transaction around
//! them. The UNIQUE title index and the affected-row count of UPDATE/DELETE
//! are the late fallbacks for races that slip past a probe.

use crate::config::StoreConfig;
use crate::logging::{single_line, MAX_LOGGED_TEXT_CHARS};
use crate::model::post::{
    NewPost, PostChanges, PostRecord, ID_COLUMN, TITLE_COLUMN, UPDATED_TIME_COLUMN,
};
use crate::outcome::{ErrorCode, Payload, QueryResult};
use crate::query::{
    column_value_condition, delete_statement, insert_statement, select_statement,
    update_statement, Condition,
};
use crate::store::{Executor, Row, StoreResult};
use log::{debug, error, info, warn};
use rusqlite::types::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Page size used by filtered reads when the caller does not pass one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Three-way probe result.
enum Probe {
    Exists(Vec<PostRecord>),
    Absent,
    /// The probe itself failed; carries the `DBERR` result to return.
    Indeterminate(QueryResult),
}

/// Record service over one posts table.
///
/// Holds no mutable state besides the injected executor, so one instance can
/// serve concurrent requests.
pub struct PostService<E: Executor> {
    executor: E,
    schema: String,
    table: String,
}

impl<E: Executor> PostService<E> {
    /// Creates a service targeting `schema.table`.
    pub fn new(executor: E, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            executor,
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Creates a service targeting the schema/table named in `config`.
    pub fn from_config(executor: E, config: &StoreConfig) -> Self {
        Self::new(executor, config.schema.as_str(), config.table.as_str())
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Lists posts page by page. Row order is unspecified.
    ///
    /// Precondition: `limit`/`offset` were already validated by the caller.
    pub fn list_all(&self, fields: &[String], limit: u32, offset: u32) -> QueryResult {
        let statement =
            select_statement(&self.schema, &self.table, fields, limit, offset).build(None);
        let result = self.execute_with_try("post_list", |executor| {
            read_rows(executor.query(&statement)?)
        });
        log_outcome("post_list", &result);
        result
    }

    /// Gets the post with `id`. An unknown id yields `OK` with no rows.
    pub fn get_by_id(&self, id: &str, fields: &[String]) -> QueryResult {
        let condition = column_value_condition(ID_COLUMN, id.to_string());
        let result = self.get_by_condition(&condition, fields, DEFAULT_LIMIT, 0);
        log_outcome("post_get", &result);
        result
    }

    /// Creates a post with a generated id and both timestamps set to now.
    ///
    /// Required fields are validated by the caller. On success the payload is
    /// [`Payload::Created`] with the new id.
    pub fn create(&self, post: NewPost) -> QueryResult {
        match self.probe(column_value_condition(TITLE_COLUMN, post.title.clone())) {
            Probe::Exists(_) => {
                let result = QueryResult::code(ErrorCode::DupTitle);
                log_outcome("post_create", &result);
                return result;
            }
            Probe::Indeterminate(result) => {
                log_outcome("post_create", &result);
                return result;
            }
            Probe::Absent => {}
        }

        let id = Uuid::new_v4().to_string();
        let record = post.into_record(&id, now_epoch_ms());
        let statement = insert_statement(&self.schema, &self.table, &record);

        let result = self.execute_with_try("post_create", |executor| {
            executor.execute(&statement)?;
            Ok(QueryResult::ok(Payload::Created { id }))
        });
        log_outcome("post_create", &result);
        result
    }

    /// Applies a partial update to the post with `id`.
    ///
    /// Omitted and empty fields are left untouched; `updated_time` is always
    /// advanced.
    pub fn update(&self, id: &str, changes: PostChanges) -> QueryResult {
        let result = self.update_inner(id, changes);
        log_outcome("post_update", &result);
        result
    }

    /// Deletes the post with `id`.
    pub fn delete(&self, id: &str) -> QueryResult {
        let result = self.delete_inner(id);
        log_outcome("post_delete", &result);
        result
    }

    fn update_inner(&self, id: &str, changes: PostChanges) -> QueryResult {
        let target = column_value_condition(ID_COLUMN, id.to_string());
        let existing = match self.probe(target.clone()) {
            Probe::Exists(rows) => rows,
            Probe::Absent => return QueryResult::code(ErrorCode::NoExist),
            Probe::Indeterminate(result) => return result,
        };

        let mut changes = changes.into_changes();
        if let Some(Value::Text(title)) = changes.get(TITLE_COLUMN) {
            match self.probe(column_value_condition(TITLE_COLUMN, title.clone())) {
                Probe::Exists(rows) if rows.iter().any(|row| row.id.as_deref() != Some(id)) => {
                    return QueryResult::code(ErrorCode::DupTitle);
                }
                Probe::Indeterminate(result) => return result,
                Probe::Exists(_) | Probe::Absent => {}
            }
        }

        let previous = existing
            .iter()
            .filter_map(|row| row.updated_time)
            .max()
            .unwrap_or(i64::MIN);
        let updated_time = now_epoch_ms().max(previous.saturating_add(1));
        changes.insert(
            UPDATED_TIME_COLUMN.to_string(),
            Value::Integer(updated_time),
        );

        let statement = update_statement(&self.schema, &self.table, &target, &changes);
        self.execute_with_try("post_update", |executor| {
            Ok(mutation_result(executor.execute(&statement)?))
        })
    }

    fn delete_inner(&self, id: &str) -> QueryResult {
        let target = column_value_condition(ID_COLUMN, id.to_string());
        match self.probe(target.clone()) {
            Probe::Exists(_) => {}
            Probe::Absent => return QueryResult::code(ErrorCode::NoExist),
            Probe::Indeterminate(result) => return result,
        }

        let statement = delete_statement(&self.schema, &self.table, &target);
        self.execute_with_try("post_delete", |executor| {
            Ok(mutation_result(executor.execute(&statement)?))
        })
    }

    fn get_by_condition(
        &self,
        condition: &Condition,
        fields: &[String],
        limit: u32,
        offset: u32,
    ) -> QueryResult {
        let statement = select_statement(&self.schema, &self.table, fields, limit, offset)
            .build(Some(condition));
        self.execute_with_try("post_select", |executor| {
            read_rows(executor.query(&statement)?)
        })
    }

    /// Re-enters the read path and classifies the row count.
    fn probe(&self, condition: Condition) -> Probe {
        let fields = [ID_COLUMN.to_string(), UPDATED_TIME_COLUMN.to_string()];
        let result = self.get_by_condition(&condition, &fields, DEFAULT_LIMIT, 0);
        if !result.is_ok() {
            warn!(
                "event=probe module=service status=indeterminate column={}",
                condition.column()
            );
            return Probe::Indeterminate(result);
        }

        match result.payload {
            Payload::Rows(rows) if !rows.is_empty() => Probe::Exists(rows),
            _ => Probe::Absent,
        }
    }

    /// Single conversion point from execution errors to the taxonomy.
    ///
    /// A UNIQUE violation on `title` becomes `DUPTITLE`; every other error is
    /// logged and becomes `DBERR` carrying the error.
    fn execute_with_try(
        &self,
        event: &'static str,
        run: impl FnOnce(&E) -> StoreResult<QueryResult>,
    ) -> QueryResult {
        match run(&self.executor) {
            Ok(result) => result,
            Err(err) if err.is_unique_violation_on(TITLE_COLUMN) => {
                warn!(
                    "event={event} module=service status=conflict errno=DUPTITLE error={}",
                    single_line(&err.to_string(), MAX_LOGGED_TEXT_CHARS)
                );
                QueryResult::code(ErrorCode::DupTitle)
            }
            Err(err) => {
                error!(
                    "event={event} module=service status=error errno=DBERR table={}.{} error={}",
                    self.schema,
                    self.table,
                    single_line(&err.to_string(), MAX_LOGGED_TEXT_CHARS)
                );
                QueryResult::db_error(err)
            }
        }
    }
}

fn read_rows(rows: Vec<Row>) -> StoreResult<QueryResult> {
    let records = rows
        .iter()
        .map(PostRecord::from_row)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(QueryResult::ok(Payload::Rows(records)))
}

/// Zero affected rows after a passing probe means the row vanished in between.
fn mutation_result(changed: usize) -> QueryResult {
    if changed == 0 {
        QueryResult::code(ErrorCode::NoExist)
    } else {
        QueryResult::ok(Payload::Ack)
    }
}

fn log_outcome(event: &str, result: &QueryResult) {
    match result.errno {
        ErrorCode::Ok => info!(
            "event={event} module=service status=ok rows={}",
            result.rows().len()
        ),
        ErrorCode::DbErr => debug!("event={event} module=service status=error errno=DBERR"),
        other => info!("event={event} module=service status=rejected errno={other}"),
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
