//! Posts table definition.

use crate::query::{qualified_table, quote_identifier};
use rusqlite::Connection;

/// Creates the posts table and its unique title index when missing.
pub fn ensure_posts_table(conn: &Connection, schema: &str, table: &str) -> rusqlite::Result<()> {
    let qualified = qualified_table(schema, table);
    let index = format!(
        "{}.{}",
        quote_identifier(schema),
        quote_identifier(&format!("{table}_title_key"))
    );

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {qualified} (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            subtitle TEXT NOT NULL,
            author_id INTEGER NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            body TEXT NOT NULL,
            created_time INTEGER NOT NULL,
            updated_time INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS {index} ON {} (title);",
        quote_identifier(table)
    ))
}

/// Returns whether `schema.table` exists.
pub fn table_exists(conn: &Connection, schema: &str, table: &str) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(
                SELECT 1
                FROM {}.sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            quote_identifier(schema)
        ),
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
