//! Wire protocol for rtdb.
//!
//! Maps node-level operations onto REST calls against the hierarchical JSON
//! store and classifies the responses into typed outcomes. The actual network
//! I/O sits behind the [`Transport`] trait; [`HttpTransport`] is the
//! production implementation and [`ScriptedTransport`] replays canned
//! responses for tests.

pub mod adapter;
pub mod auth;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod message;
pub mod scripted;
pub mod transport;

pub use adapter::{classify, decode_json, Adapter};
pub use auth::AuthMethod;
pub use context::CallContext;
pub use endpoint::{headers, query, status, Endpoint};
pub use error::{ProtocolError, ProtocolResult};
pub use http::HttpTransport;
pub use message::{ApiRequest, Headers, HttpRequest, HttpResponse, Method, Outcome};
pub use scripted::ScriptedTransport;
pub use transport::Transport;
