use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use rtdb_types::NodePath;

use crate::error::{ProtocolError, ProtocolResult};

/// HTTP methods used by the REST protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header. Existing entries with the same name are kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A request against one node of the store, before endpoint resolution.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: NodePath,
    pub headers: Headers,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl ApiRequest {
    pub fn new(method: Method, path: NodePath) -> Self {
        Self {
            method,
            path,
            headers: Headers::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serialize `value` as the JSON request body.
    pub fn with_json_body<T: Serialize + ?Sized>(mut self, value: &T) -> ProtocolResult<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        self.body = Some(Bytes::from(body));
        Ok(self)
    }
}

/// A fully resolved HTTP request as handed to a [`Transport`](crate::Transport).
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Value of query parameter `key`, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Body parsed as JSON, if there is one.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Raw response returned by a transport.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Response with a JSON body.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status).with_body(value.to_string())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Classified result of a single call.
///
/// Statuses that match neither the expected success status nor one of the
/// conditional statuses are reported as [`ProtocolError::Backend`] instead.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The status matched the operation's expected success status.
    Ok { body: Bytes, headers: Headers },
    /// HTTP 412: a conditional write lost the race. The body carries the
    /// value currently stored.
    PreconditionFailed { body: Bytes, headers: Headers },
    /// HTTP 304: a conditional read found the value unchanged.
    NotModified { headers: Headers },
}

impl Outcome {
    pub fn headers(&self) -> &Headers {
        match self {
            Self::Ok { headers, .. }
            | Self::PreconditionFailed { headers, .. }
            | Self::NotModified { headers } => headers,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
