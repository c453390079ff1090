//! SQL condition and statement construction.
//!
//! # Responsibility
//! - Build column/value equality predicates shared by read and write paths.
//! - Generate parameterized SELECT/INSERT/UPDATE/DELETE statements scoped to
//!   an explicit `(schema, table)` pair.
//!
//! # Invariants
//! - Values are always bound parameters; only identifiers are interpolated,
//!   and identifiers are always quoted.
//! - Builders never execute anything and never fail.

pub mod condition;
pub mod statement;

pub use condition::{column_value_condition, Condition};
pub use statement::{
    delete_statement, insert_statement, select_statement, update_statement, Changes,
    SelectBuilder, Statement,
};

/// Quotes one SQL identifier, doubling embedded quote characters.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders `"schema"."table"`.
pub(crate) fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(table))
}
