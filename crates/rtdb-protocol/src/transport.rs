use async_trait::async_trait;

use crate::error::ProtocolResult;
use crate::message::{HttpRequest, HttpResponse};

/// Network collaborator that performs one authenticated HTTP exchange.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; `Err` is reserved for failures below HTTP (connection refused,
/// reset, timeout). Pooling, TLS and credentials are the implementation's
/// concern.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> ProtocolResult<HttpResponse>;
}
