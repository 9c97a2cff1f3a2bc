//! Client for the rtdb hierarchical JSON store.
//!
//! A [`DatabaseClient`] is built once from a [`ClientConfig`] and a
//! transport. It hands out [`Reference`]s, immutable handles to one path in
//! the tree, which carry every read and write operation.
//!
//! # Concurrency
//!
//! The store only offers ETag-conditional writes. On top of those a reference
//! provides:
//!
//! - [`Reference::set_if_unchanged`] — a single compare-and-set
//! - [`Reference::transaction`] — an optimistic read-modify-write loop,
//!   bounded by [`MAX_TRANSACTION_ATTEMPTS`]
//!
//! Every operation takes a [`CallContext`] whose deadline and cancellation
//! token are honoured at each network call.
//!
//! # Modules
//!
//! - [`client`] — [`DatabaseClient`]
//! - [`config`] — [`ClientConfig`], loadable from TOML
//! - [`reference`] — [`Reference`] and its operations
//! - [`transaction`] — the optimistic transaction engine
//! - [`error`] — [`DbError`] taxonomy

pub mod client;
pub mod config;
pub mod error;
pub mod reference;
pub mod transaction;

pub use client::DatabaseClient;
pub use config::ClientConfig;
pub use error::{DbError, DbResult};
pub use reference::{Conditional, Reference};
pub use transaction::MAX_TRANSACTION_ATTEMPTS;

// Re-export the types callers need alongside a reference.
pub use rtdb_protocol::{AuthMethod, CallContext, Transport};
pub use rtdb_types::{ETag, NodePath};
