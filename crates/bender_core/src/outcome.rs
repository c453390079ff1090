//! Closed outcome taxonomy shared by the record service and its callers.
//!
//! # Invariants
//! - Every record service operation returns a [`QueryResult`]; execution
//!   errors never escape as `Err`.
//! - `Un`, `BadParams` and `DupId` are reserved for boundary-layer validation
//!   and are never produced by the record service.

use crate::model::post::{PostId, PostRecord};
use crate::store::StoreError;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Outcome code of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorCode {
    /// Succeeded, possibly with zero matching rows for reads.
    Ok,
    /// The store raised an error while executing a statement.
    DbErr,
    /// Unknown/unclassified error.
    Un,
    /// Request parameters failed boundary validation.
    BadParams,
    /// Duplicate identifier.
    DupId,
    /// Create/update would break title uniqueness.
    DupTitle,
    /// Mutation target does not exist.
    NoExist,
}

impl ErrorCode {
    /// Stable wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::DbErr => "DBERR",
            Self::Un => "UN",
            Self::BadParams => "BADPARAMS",
            Self::DupId => "DUPID",
            Self::DupTitle => "DUPTITLE",
            Self::NoExist => "NOEXIST",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data attached to a [`QueryResult`].
#[derive(Debug)]
pub enum Payload {
    /// Nothing to report; used by short-circuited operations.
    Empty,
    /// Rows matched by a read. May be empty.
    Rows(Vec<PostRecord>),
    /// A write succeeded.
    Ack,
    /// A create succeeded and assigned `id`.
    Created { id: PostId },
    /// The caught execution error.
    Failed(StoreError),
}

/// `(ErrorCode, payload)` pair returned by every record service operation.
#[derive(Debug)]
pub struct QueryResult {
    pub errno: ErrorCode,
    pub payload: Payload,
}

impl QueryResult {
    pub fn new(errno: ErrorCode, payload: Payload) -> Self {
        Self { errno, payload }
    }

    /// Successful result carrying `payload`.
    pub fn ok(payload: Payload) -> Self {
        Self::new(ErrorCode::Ok, payload)
    }

    /// Result with `errno` and no payload.
    pub fn code(errno: ErrorCode) -> Self {
        Self::new(errno, Payload::Empty)
    }

    /// `DBERR` carrying the caught error.
    pub fn db_error(err: StoreError) -> Self {
        Self::new(ErrorCode::DbErr, Payload::Failed(err))
    }

    pub fn is_ok(&self) -> bool {
        self.errno == ErrorCode::Ok
    }

    /// Rows of a read result; empty for every other payload.
    pub fn rows(&self) -> &[PostRecord] {
        match &self.payload {
            Payload::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Identifier assigned by a successful create.
    pub fn created_id(&self) -> Option<&str> {
        match &self.payload {
            Payload::Created { id } => Some(id),
            _ => None,
        }
    }
}
