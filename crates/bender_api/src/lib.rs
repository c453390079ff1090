//! Boundary layer for the Bender blog API.
//!
//! Parses and validates transport input, calls the core post service, and
//! maps outcome codes to status codes and response envelopes. Transport
//! wiring (HTTP server, routing) stays with the embedding binary.

pub mod api;
pub mod params;
pub mod response;
pub mod status;

pub use api::{BlogApi, GREETING};
pub use params::{CreateRequest, ListParams, RequestError, UpdateRequest};
pub use response::{ApiResponse, Link, ResponseBody};
pub use status::{status_for, Operation};
