use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::context::CallContext;
use crate::endpoint::{status, Endpoint};
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{ApiRequest, HttpResponse, Outcome};
use crate::transport::Transport;

/// Sends node requests through a [`Transport`] and classifies the responses.
///
/// The adapter performs exactly one network call per [`send`](Self::send);
/// retry policy belongs to the caller.
#[derive(Clone)]
pub struct Adapter {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl Adapter {
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Perform `request`, treating `expect` as the success status.
    pub async fn send(
        &self,
        ctx: &CallContext,
        request: ApiRequest,
        expect: u16,
    ) -> ProtocolResult<Outcome> {
        let method = request.method;
        let path = request.path.clone();
        let http = self.endpoint.resolve(request)?;

        let response = ctx.run(self.transport.execute(http)).await?;
        debug!(%method, %path, status = response.status, expect, "request completed");
        let outcome = classify(response, expect);
        if let Err(ProtocolError::Backend { status, message }) = &outcome {
            warn!(%method, %path, status, %message, "backend rejected request");
        }
        outcome
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Map a raw response onto an [`Outcome`] given the expected success status.
///
/// The expected status wins over the conditional ones, so an operation whose
/// success status is 304 or 412 would never see those outcomes.
pub fn classify(response: HttpResponse, expect: u16) -> ProtocolResult<Outcome> {
    let HttpResponse {
        status: code,
        headers,
        body,
    } = response;
    match code {
        c if c == expect => Ok(Outcome::Ok { body, headers }),
        status::PRECONDITION_FAILED => Ok(Outcome::PreconditionFailed { body, headers }),
        status::NOT_MODIFIED => Ok(Outcome::NotModified { headers }),
        _ => Err(ProtocolError::Backend {
            status: code,
            message: backend_message(code, &body),
        }),
    }
}

/// Decode a JSON response body.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> ProtocolResult<T> {
    serde_json::from_slice(body).map_err(|e| ProtocolError::Deserialization(e.to_string()))
}

/// Best available description of a failed call: the backend's `error` field,
/// then the raw body text, then a generic message.
fn backend_message(code: u16, body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return parsed.error;
    }
    match std::str::from_utf8(body).map(str::trim) {
        Ok(text) if !text.is_empty() => text.to_string(),
        _ => format!("unexpected http status {code}"),
    }
}
