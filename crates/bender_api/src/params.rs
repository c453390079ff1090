//! Request parameter parsing and validation.
//!
//! # Invariants
//! - Anything rejected here is answered with `BADPARAMS` and never reaches
//!   the record service.

use bender_core::model::post::is_post_column;
use bender_core::{NewPost, PostChanges};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_OFFSET: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    InvalidNumber { name: &'static str, value: String },
    UnknownField(String),
    MissingField(&'static str),
    MalformedBody(String),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { name, value } => {
                write!(f, "`{name}` must be a non-negative integer, got `{value}`")
            }
            Self::UnknownField(field) => write!(f, "unknown field `{field}`"),
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::MalformedBody(message) => write!(f, "malformed request body: {message}"),
        }
    }
}

impl Error for RequestError {}

/// Parsed `fields` / `limit` / `offset` query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub fields: Vec<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl ListParams {
    /// Parses raw query-string values. Absent values take the defaults.
    pub fn parse(
        fields: Option<&str>,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            fields: parse_fields(fields.unwrap_or_default())?,
            limit: parse_count("limit", limit, DEFAULT_LIMIT)?,
            offset: parse_count("offset", offset, DEFAULT_OFFSET)?,
        })
    }
}

/// Splits a comma-separated column list. Empty input selects every column.
pub fn parse_fields(raw: &str) -> Result<Vec<String>, RequestError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(str::trim)
        .map(|field| {
            if is_post_column(field) {
                Ok(field.to_string())
            } else {
                Err(RequestError::UnknownField(field.to_string()))
            }
        })
        .collect()
}

fn parse_count(
    name: &'static str,
    raw: Option<&str>,
    default: u32,
) -> Result<u32, RequestError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<u32>().map_err(|_| RequestError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

/// Body of a create request. Missing keys deserialize to empty values and are
/// then rejected by [`CreateRequest::into_new_post`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateRequest {
    pub title: String,
    pub subtitle: String,
    pub author_id: Option<i64>,
    pub tags: Vec<String>,
    pub body: String,
}

impl CreateRequest {
    pub fn from_json(raw: &str) -> Result<Self, RequestError> {
        serde_json::from_str(raw).map_err(|err| RequestError::MalformedBody(err.to_string()))
    }

    /// Checks required fields: `title`, `subtitle`, `body` non-empty and a
    /// non-zero `author_id`.
    pub fn into_new_post(self) -> Result<NewPost, RequestError> {
        if self.title.is_empty() {
            return Err(RequestError::MissingField("title"));
        }
        if self.subtitle.is_empty() {
            return Err(RequestError::MissingField("subtitle"));
        }
        let author_id = match self.author_id {
            Some(id) if id != 0 => id,
            _ => return Err(RequestError::MissingField("author_id")),
        };
        if self.body.is_empty() {
            return Err(RequestError::MissingField("body"));
        }

        Ok(NewPost {
            title: self.title,
            subtitle: self.subtitle,
            author_id,
            tags: self.tags,
            body: self.body,
        })
    }
}

/// Body of an update request.
///
/// `author_id` is accepted for wire compatibility but ignored: it is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    pub title: String,
    pub subtitle: String,
    pub tags: Vec<String>,
    pub body: String,
    pub author_id: Option<i64>,
}

impl UpdateRequest {
    pub fn from_json(raw: &str) -> Result<Self, RequestError> {
        serde_json::from_str(raw).map_err(|err| RequestError::MalformedBody(err.to_string()))
    }

    /// Keeps only non-empty fields.
    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            title: Some(self.title),
            subtitle: Some(self.subtitle),
            tags: Some(self.tags),
            body: Some(self.body),
        }
        .without_empty()
    }
}
