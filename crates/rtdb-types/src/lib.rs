//! Foundation types for rtdb.
//!
//! This crate provides the addressing and versioning vocabulary shared by the
//! rest of the workspace. Every other rtdb crate depends on `rtdb-types`.
//!
//! # Key Types
//!
//! - [`NodePath`] — Slash-delimited location of a node in the hierarchical store
//! - [`ETag`] — Opaque version token used for conditional reads and writes
//! - [`validate_segment`] — Key rules enforced on every path segment

pub mod error;
pub mod etag;
pub mod names;
pub mod path;

pub use error::{PathError, PathResult};
pub use etag::ETag;
pub use names::validate_segment;
pub use path::NodePath;
