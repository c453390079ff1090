//! Domain model for blog posts.
//!
//! # Responsibility
//! - Define the persisted entity and the shapes used to create, update and
//!   read it.
//!
//! # Invariants
//! - Every post is identified by a stable `PostId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod post;
