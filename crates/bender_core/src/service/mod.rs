//! Core use-case services.
//!
//! # Responsibility
//! - Apply business invariants before delegating to statement builders and
//!   the executor.
//! - Keep callers decoupled from SQL and store errors.

pub mod post_service;
