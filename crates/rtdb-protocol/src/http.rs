//! `reqwest`-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::auth::AuthMethod;
use crate::endpoint::headers;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Headers, HttpRequest, HttpResponse, Method};
use crate::transport::Transport;

pub const DEFAULT_USER_AGENT: &str = concat!("rtdb-rs/", env!("CARGO_PKG_VERSION"));

/// Production transport over a pooled `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    auth: AuthMethod,
}

impl HttpTransport {
    /// Build a transport with a per-request timeout and user agent.
    pub fn new(auth: AuthMethod, timeout: Duration, user_agent: &str) -> ProtocolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;
        Ok(Self { client, auth })
    }

    pub fn auth(&self) -> &AuthMethod {
        &self.auth
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> ProtocolResult<HttpResponse> {
        let mut builder = self
            .client
            .request(to_reqwest(request.method), &request.url)
            .query(&request.query);

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(value) = self.auth.authorization_header() {
            builder = builder.header(reqwest::header::AUTHORIZATION, value);
        }
        if let Some(body) = request.body {
            builder = builder
                .header(headers::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let response_headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;

        debug!(method = %request.method, url = %request.url, status, "http exchange");
        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
