//! Instance ID management.
//!
//! Deletes an app instance ID, and the data associated with it, from a
//! project. This is a single stateless DELETE; it reuses the transport and
//! call context of [`rtdb_protocol`] but none of the reference machinery.

pub mod client;
pub mod error;

pub use client::{InstanceIdClient, InstanceIdConfig, DEFAULT_ENDPOINT};
pub use error::{IidError, IidResult};
