//! Addressable handles to single nodes of the store.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rtdb_protocol::{
    decode_json, headers, query, status, ApiRequest, CallContext, Headers, Method, Outcome,
};
use rtdb_types::{ETag, NodePath};

use crate::client::DatabaseClient;
use crate::error::{DbError, DbResult};

/// Result of a conditional read.
#[derive(Clone, Debug, PartialEq)]
pub enum Conditional<T> {
    /// The value differs from the one the ETag was taken from.
    Changed { value: T, etag: ETag },
    /// The value is unchanged; `etag` is the caller's tag, returned as is.
    Unchanged { etag: ETag },
}

impl<T> Conditional<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    /// The ETag that is current after this read.
    pub fn etag(&self) -> &ETag {
        match self {
            Self::Changed { etag, .. } | Self::Unchanged { etag } => etag,
        }
    }

    /// The new value, if there is one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Changed { value, .. } => Some(value),
            Self::Unchanged { .. } => None,
        }
    }
}

/// Outcome of a conditional PUT.
pub(crate) enum WriteOutcome {
    Written,
    /// The backend rejected the write; `body` is the current value and
    /// `etag` its tag when the backend supplied one.
    Conflict { body: Bytes, etag: Option<ETag> },
}

/// Handle to the node at one path.
///
/// A `Reference` is an immutable `{client, path}` pair. It is cheap to create
/// and clone and can be shared between tasks: all per-operation state lives
/// on the stack of the running call. Two references are equal when their
/// canonical paths are equal.
#[derive(Clone)]
pub struct Reference {
    client: DatabaseClient,
    path: NodePath,
}

impl Reference {
    pub(crate) fn new(client: DatabaseClient, path: NodePath) -> Self {
        Self { client, path }
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Last path segment, or `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.path.key()
    }

    /// Reference to the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Reference> {
        self.path
            .parent()
            .map(|path| Reference::new(self.client.clone(), path))
    }

    /// Reference to a descendant. `path` is relative and must not start
    /// with `/`.
    pub fn child(&self, path: &str) -> DbResult<Reference> {
        let path = self.path.child(path)?;
        Ok(Reference::new(self.client.clone(), path))
    }

    /// Read the value at this node.
    pub async fn get<T: DeserializeOwned>(&self, ctx: &CallContext) -> DbResult<T> {
        let request = ApiRequest::new(Method::Get, self.path.clone());
        let (body, _) = self.send_ok(ctx, request, status::OK).await?;
        Ok(decode_json(&body)?)
    }

    /// Read the value together with its current ETag.
    pub async fn get_with_etag<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
    ) -> DbResult<(T, ETag)> {
        let request = ApiRequest::new(Method::Get, self.path.clone())
            .with_header(headers::ETAG_REQUEST, "true");
        let (body, response_headers) = self.send_ok(ctx, request, status::OK).await?;
        let etag = require_etag(&response_headers)?;
        Ok((decode_json(&body)?, etag))
    }

    /// Read the value only if it no longer matches `etag`.
    pub async fn get_if_changed<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        etag: &ETag,
    ) -> DbResult<Conditional<T>> {
        let request = ApiRequest::new(Method::Get, self.path.clone())
            .with_header(headers::ETAG_REQUEST, "true")
            .with_header(headers::IF_NONE_MATCH, etag.as_str());
        match self.send(ctx, request, status::OK).await? {
            Outcome::Ok {
                body,
                headers: response_headers,
            } => Ok(Conditional::Changed {
                value: decode_json(&body)?,
                etag: require_etag(&response_headers)?,
            }),
            Outcome::NotModified { .. } => Ok(Conditional::Unchanged { etag: etag.clone() }),
            Outcome::PreconditionFailed { body, .. } => {
                Err(unexpected(status::PRECONDITION_FAILED, &body))
            }
        }
    }

    /// Overwrite the value at this node.
    pub async fn set<V: Serialize + ?Sized>(&self, ctx: &CallContext, value: &V) -> DbResult<()> {
        let request = ApiRequest::new(Method::Put, self.path.clone())
            .with_query(query::PRINT, query::SILENT)
            .with_json_body(value)?;
        self.send_ok(ctx, request, status::NO_CONTENT).await?;
        Ok(())
    }

    /// Overwrite the value only if it still matches `etag`.
    ///
    /// Returns `false`, not an error, when another writer got there first.
    pub async fn set_if_unchanged<V: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        etag: &ETag,
        value: &V,
    ) -> DbResult<bool> {
        match self.compare_and_set(ctx, etag, value).await? {
            WriteOutcome::Written => Ok(true),
            WriteOutcome::Conflict { .. } => Ok(false),
        }
    }

    /// Append `value` under a backend-generated key and return its reference.
    pub async fn push<V: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        value: &V,
    ) -> DbResult<Reference> {
        let request = ApiRequest::new(Method::Post, self.path.clone()).with_json_body(value)?;
        let (body, _) = self.send_ok(ctx, request, status::OK).await?;

        #[derive(Deserialize)]
        struct Pushed {
            name: String,
        }
        let pushed: Pushed = decode_json(&body)?;
        let child = self.child(&pushed.name)?;
        debug!(path = %child.path, "pushed child");
        Ok(child)
    }

    /// Reserve a backend-generated child key, storing an empty string there.
    pub async fn push_empty(&self, ctx: &CallContext) -> DbResult<Reference> {
        self.push(ctx, "").await
    }

    /// Write several children in one request. Keys are relative paths.
    pub async fn update<V: Serialize>(
        &self,
        ctx: &CallContext,
        values: &BTreeMap<String, V>,
    ) -> DbResult<()> {
        if values.is_empty() {
            return Err(DbError::Validation(
                "value argument must be a non-empty map".into(),
            ));
        }
        let request = ApiRequest::new(Method::Patch, self.path.clone())
            .with_query(query::PRINT, query::SILENT)
            .with_json_body(values)?;
        self.send_ok(ctx, request, status::NO_CONTENT).await?;
        Ok(())
    }

    /// Remove the value at this node.
    pub async fn delete(&self, ctx: &CallContext) -> DbResult<()> {
        let request = ApiRequest::new(Method::Delete, self.path.clone());
        self.send_ok(ctx, request, status::OK).await?;
        Ok(())
    }

    /// Conditional PUT shared by `set_if_unchanged` and transactions.
    pub(crate) async fn compare_and_set<V: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        etag: &ETag,
        value: &V,
    ) -> DbResult<WriteOutcome> {
        let request = ApiRequest::new(Method::Put, self.path.clone())
            .with_header(headers::IF_MATCH, etag.as_str())
            .with_json_body(value)?;
        match self.send(ctx, request, status::OK).await? {
            Outcome::Ok { .. } => Ok(WriteOutcome::Written),
            Outcome::PreconditionFailed {
                body,
                headers: response_headers,
            } => Ok(WriteOutcome::Conflict {
                body,
                etag: response_headers.get(headers::ETAG).map(ETag::from),
            }),
            Outcome::NotModified { .. } => Err(unexpected(status::NOT_MODIFIED, b"")),
        }
    }

    async fn send(
        &self,
        ctx: &CallContext,
        request: ApiRequest,
        expect: u16,
    ) -> DbResult<Outcome> {
        Ok(self.client.adapter().send(ctx, request, expect).await?)
    }

    /// Send and require the expected success status.
    async fn send_ok(
        &self,
        ctx: &CallContext,
        request: ApiRequest,
        expect: u16,
    ) -> DbResult<(Bytes, Headers)> {
        match self.send(ctx, request, expect).await? {
            Outcome::Ok {
                body,
                headers: response_headers,
            } => Ok((body, response_headers)),
            Outcome::PreconditionFailed { body, .. } => {
                Err(unexpected(status::PRECONDITION_FAILED, &body))
            }
            Outcome::NotModified { .. } => Err(unexpected(status::NOT_MODIFIED, b"")),
        }
    }
}

fn require_etag(response_headers: &Headers) -> DbResult<ETag> {
    response_headers
        .get(headers::ETAG)
        .map(ETag::from)
        .ok_or_else(|| DbError::Decode(format!("response is missing the {} header", headers::ETAG)))
}

/// A conditional status arriving on a call that did not ask for one.
fn unexpected(code: u16, body: &[u8]) -> DbError {
    let text = String::from_utf8_lossy(body);
    DbError::Backend {
        status: code,
        message: if text.trim().is_empty() {
            format!("unexpected http status {code}")
        } else {
            text.into_owned()
        },
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Reference {}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.path)
    }
}
