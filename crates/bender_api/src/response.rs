//! Response envelope.

use bender_core::{ErrorCode, Payload};
use serde::Serialize;
use serde_json::{json, Value};

/// Hypermedia link attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: String,
    pub link: String,
}

/// `{message, data, links}` body returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseBody {
    pub message: ErrorCode,
    pub data: Value,
    pub links: Vec<Link>,
}

impl ResponseBody {
    pub fn new(message: ErrorCode, data: Value) -> Self {
        Self {
            message,
            data,
            links: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }
}

/// Status plus body, ready for any transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

/// Renders a service payload as response data.
///
/// Store errors are reduced to a generic message; details only go to the log.
pub fn payload_data(payload: &Payload) -> Value {
    match payload {
        Payload::Empty => json!([]),
        Payload::Rows(rows) => serde_json::to_value(rows).unwrap_or_else(|_| json!([])),
        Payload::Ack => json!({}),
        Payload::Created { id } => json!({ "id": id }),
        Payload::Failed(_) => json!({ "error": "database error" }),
    }
}

/// Link to the current page of a list.
pub fn current_page_link(limit: u32, offset: u32) -> Link {
    Link {
        rel: "cur".to_string(),
        link: format!("/api/blogs?limit={limit}&offset={offset}"),
    }
}
