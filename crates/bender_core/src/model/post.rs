//! Blog post domain model.
//!
//! # Responsibility
//! - Define the persisted post entity and its projected read shape.
//! - Define create/update inputs and their conversion into column changes.
//!
//! # Invariants
//! - `title` is unique across all posts.
//! - `author_id` and `created_time` never change after creation.
//! - `updated_time` increases with every successful mutation.
//! - Tags are persisted as a JSON array string.

use crate::query::Changes;
use crate::store::{Row, StoreError, StoreResult};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Stable post identifier (UUID v4 text for posts created by this crate).
pub type PostId = String;

pub const ID_COLUMN: &str = "id";
pub const TITLE_COLUMN: &str = "title";
pub const SUBTITLE_COLUMN: &str = "subtitle";
pub const AUTHOR_ID_COLUMN: &str = "author_id";
pub const TAGS_COLUMN: &str = "tags";
pub const BODY_COLUMN: &str = "body";
pub const CREATED_TIME_COLUMN: &str = "created_time";
pub const UPDATED_TIME_COLUMN: &str = "updated_time";

/// Every column of the posts table, in declaration order.
pub const POST_COLUMNS: &[&str] = &[
    ID_COLUMN,
    TITLE_COLUMN,
    SUBTITLE_COLUMN,
    AUTHOR_ID_COLUMN,
    TAGS_COLUMN,
    BODY_COLUMN,
    CREATED_TIME_COLUMN,
    UPDATED_TIME_COLUMN,
];

/// Returns whether `name` is a column of the posts table.
pub fn is_post_column(name: &str) -> bool {
    POST_COLUMNS.contains(&name)
}

/// Complete persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    pub subtitle: String,
    /// Reference to an external author identity; not checked against any table.
    pub author_id: i64,
    pub tags: Vec<String>,
    pub body: String,
    /// Unix epoch milliseconds.
    pub created_time: i64,
    /// Unix epoch milliseconds.
    pub updated_time: i64,
}

/// One row as returned by a (possibly projected) select.
///
/// Columns left out of the projection stay `None` and are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PostId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<i64>,
}

impl PostRecord {
    /// Decodes one store row. Unknown columns are ignored.
    pub fn from_row(row: &Row) -> StoreResult<Self> {
        let tags = match text_column(row, TAGS_COLUMN)? {
            Some(raw) => Some(decode_tags(&raw)?),
            None => None,
        };

        Ok(Self {
            id: text_column(row, ID_COLUMN)?,
            title: text_column(row, TITLE_COLUMN)?,
            subtitle: text_column(row, SUBTITLE_COLUMN)?,
            author_id: integer_column(row, AUTHOR_ID_COLUMN)?,
            tags,
            body: text_column(row, BODY_COLUMN)?,
            created_time: integer_column(row, CREATED_TIME_COLUMN)?,
            updated_time: integer_column(row, UPDATED_TIME_COLUMN)?,
        })
    }

    /// Converts into a full post when every column was selected.
    pub fn into_post(self) -> Option<BlogPost> {
        Some(BlogPost {
            id: self.id?,
            title: self.title?,
            subtitle: self.subtitle?,
            author_id: self.author_id?,
            tags: self.tags?,
            body: self.body?,
            created_time: self.created_time?,
            updated_time: self.updated_time?,
        })
    }
}

/// Input for creating one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub subtitle: String,
    pub author_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub body: String,
}

impl NewPost {
    /// Column values for the insert; timestamps are supplied by the caller.
    pub fn into_record(self, id: &str, created_time: i64) -> Changes {
        let mut record = Changes::new();
        record.insert(ID_COLUMN.to_string(), Value::Text(id.to_string()));
        record.insert(TITLE_COLUMN.to_string(), Value::Text(self.title));
        record.insert(SUBTITLE_COLUMN.to_string(), Value::Text(self.subtitle));
        record.insert(AUTHOR_ID_COLUMN.to_string(), Value::Integer(self.author_id));
        record.insert(TAGS_COLUMN.to_string(), Value::Text(encode_tags(&self.tags)));
        record.insert(BODY_COLUMN.to_string(), Value::Text(self.body));
        record.insert(CREATED_TIME_COLUMN.to_string(), Value::Integer(created_time));
        record.insert(UPDATED_TIME_COLUMN.to_string(), Value::Integer(created_time));
        record
    }
}

/// Partial update input.
///
/// `None` leaves a column untouched. An explicitly empty value is treated the
/// same way, so clearing a field is not expressible. `author_id` is not
/// updatable and therefore has no field here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub tags: Option<Vec<String>>,
    pub body: Option<String>,
}

impl PostChanges {
    /// Drops fields that are present but empty.
    pub fn without_empty(self) -> Self {
        Self {
            title: self.title.filter(|value| !value.is_empty()),
            subtitle: self.subtitle.filter(|value| !value.is_empty()),
            tags: self.tags.filter(|value| !value.is_empty()),
            body: self.body.filter(|value| !value.is_empty()),
        }
    }

    /// Column values for the update, skipping `None` and empty fields.
    pub fn into_changes(self) -> Changes {
        let normalized = self.without_empty();
        let mut changes = Changes::new();
        if let Some(title) = normalized.title {
            changes.insert(TITLE_COLUMN.to_string(), Value::Text(title));
        }
        if let Some(subtitle) = normalized.subtitle {
            changes.insert(SUBTITLE_COLUMN.to_string(), Value::Text(subtitle));
        }
        if let Some(tags) = normalized.tags {
            changes.insert(TAGS_COLUMN.to_string(), Value::Text(encode_tags(&tags)));
        }
        if let Some(body) = normalized.body {
            changes.insert(BODY_COLUMN.to_string(), Value::Text(body));
        }
        changes
    }
}

fn encode_tags(tags: &[String]) -> String {
    serde_json::Value::from(tags.to_vec()).to_string()
}

fn decode_tags(raw: &str) -> StoreResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|err| {
        StoreError::InvalidData(format!("invalid tags value `{raw}` in posts.tags: {err}"))
    })
}

fn text_column(row: &Row, column: &str) -> StoreResult<Option<String>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Text(value)) => Ok(Some(value.clone())),
        Some(other) => Err(StoreError::InvalidData(format!(
            "expected text in posts.{column}, got {:?}",
            other.data_type()
        ))),
    }
}

fn integer_column(row: &Row, column: &str) -> StoreResult<Option<i64>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(value)) => Ok(Some(*value)),
        Some(other) => Err(StoreError::InvalidData(format!(
            "expected integer in posts.{column}, got {:?}",
            other.data_type()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{NewPost, PostChanges, PostRecord, TAGS_COLUMN, TITLE_COLUMN};
    use crate::store::{Row, StoreError};
    use rusqlite::types::Value;

    fn sample_post() -> NewPost {
        NewPost {
            title: "A".to_string(),
            subtitle: "S".to_string(),
            author_id: 7,
            tags: vec!["rust".to_string()],
            body: "B".to_string(),
        }
    }

    #[test]
    fn new_post_record_sets_both_timestamps() {
        let record = sample_post().into_record("post-1", 1_000);
        assert_eq!(record.get("created_time"), Some(&Value::Integer(1_000)));
        assert_eq!(record.get("updated_time"), Some(&Value::Integer(1_000)));
        assert_eq!(
            record.get(TAGS_COLUMN),
            Some(&Value::Text("[\"rust\"]".to_string()))
        );
        assert_eq!(record.len(), 8);
    }

    #[test]
    fn post_changes_drop_empty_and_missing_fields() {
        let changes = PostChanges {
            title: Some(String::new()),
            subtitle: Some("X".to_string()),
            tags: Some(Vec::new()),
            body: None,
        }
        .into_changes();

        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes.get("subtitle"),
            Some(&Value::Text("X".to_string()))
        );
        assert!(!changes.contains_key(TITLE_COLUMN));
    }

    #[test]
    fn record_from_projected_row_leaves_other_columns_empty() {
        let mut row = Row::new();
        row.insert("title".to_string(), Value::Text("A".to_string()));
        row.insert("tags".to_string(), Value::Text("[\"a\",\"b\"]".to_string()));

        let record = PostRecord::from_row(&row).unwrap();
        assert_eq!(record.title.as_deref(), Some("A"));
        assert_eq!(
            record.tags,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(record.id.is_none());
        assert!(record.clone().into_post().is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["title"], "A");
    }

    #[test]
    fn record_rejects_wrong_column_type() {
        let mut row = Row::new();
        row.insert("author_id".to_string(), Value::Text("seven".to_string()));

        let err = PostRecord::from_row(&row).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn record_rejects_malformed_tags() {
        let mut row = Row::new();
        row.insert("tags".to_string(), Value::Text("not json".to_string()));

        let err = PostRecord::from_row(&row).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
