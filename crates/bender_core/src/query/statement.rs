//! Statement generation for one `(schema, table)` pair.
//!
//! Result ordering of SELECT is store-defined: no `ORDER BY` is emitted, so
//! callers must treat returned rows as unordered.

use super::condition::Condition;
use super::{qualified_table, quote_identifier};
use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Column -> value map for INSERT/UPDATE. Ordered so generated SQL is stable.
pub type Changes = BTreeMap<String, Value>;

/// A fully parameterized, not-yet-run statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Paginated SELECT waiting for its optional filter.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    head: String,
    limit: u32,
    offset: u32,
}

impl SelectBuilder {
    /// Finishes the select.
    ///
    /// `None` scans the whole table; `Some(condition)` keeps only rows where
    /// the condition column equals its value. Pagination applies either way.
    pub fn build(&self, condition: Option<&Condition>) -> Statement {
        let mut sql = self.head.clone();
        let mut params = Vec::with_capacity(3);

        if let Some(condition) = condition {
            sql.push_str(&format!(
                " WHERE {} = ?{}",
                quote_identifier(condition.column()),
                params.len() + 1
            ));
            params.push(condition.value().clone());
        }

        sql.push_str(&format!(
            " LIMIT ?{} OFFSET ?{}",
            params.len() + 1,
            params.len() + 2
        ));
        params.push(Value::Integer(i64::from(self.limit)));
        params.push(Value::Integer(i64::from(self.offset)));

        Statement { sql, params }
    }
}

/// Starts a paginated SELECT. Empty `fields` selects every column.
pub fn select_statement(
    schema: &str,
    table: &str,
    fields: &[String],
    limit: u32,
    offset: u32,
) -> SelectBuilder {
    let projection = if fields.is_empty() {
        "*".to_string()
    } else {
        fields
            .iter()
            .map(|field| quote_identifier(field))
            .collect::<Vec<_>>()
            .join(", ")
    };

    SelectBuilder {
        head: format!(
            "SELECT {projection} FROM {}",
            qualified_table(schema, table)
        ),
        limit,
        offset,
    }
}

/// Builds an INSERT of every entry in `record`.
///
/// Required columns are not checked here; that belongs to the caller.
pub fn insert_statement(schema: &str, table: &str, record: &Changes) -> Statement {
    let columns = record
        .keys()
        .map(|column| quote_identifier(column))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=record.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");

    Statement {
        sql: format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders})",
            qualified_table(schema, table)
        ),
        params: record.values().cloned().collect(),
    }
}

/// Builds an UPDATE setting every entry in `changes` on rows matching
/// `condition`.
///
/// Empty `changes` is emitted as-is and is rejected by the store on execution.
pub fn update_statement(
    schema: &str,
    table: &str,
    condition: &Condition,
    changes: &Changes,
) -> Statement {
    let assignments = changes
        .keys()
        .enumerate()
        .map(|(index, column)| format!("{} = ?{}", quote_identifier(column), index + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let mut params = changes.values().cloned().collect::<Vec<_>>();
    params.push(condition.value().clone());

    Statement {
        sql: format!(
            "UPDATE {} SET {assignments} WHERE {} = ?{}",
            qualified_table(schema, table),
            quote_identifier(condition.column()),
            params.len()
        ),
        params,
    }
}

/// Builds a DELETE of rows matching `condition`.
pub fn delete_statement(schema: &str, table: &str, condition: &Condition) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?1",
            qualified_table(schema, table),
            quote_identifier(condition.column())
        ),
        params: vec![condition.value().clone()],
    }
}
