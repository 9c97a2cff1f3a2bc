use rtdb_types::NodePath;
use url::Url;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{ApiRequest, HttpRequest};

/// Header names used by the REST protocol.
pub mod headers {
    /// Request header asking the backend to echo the value's ETag.
    pub const ETAG_REQUEST: &str = "X-Firebase-ETag";
    pub const ETAG: &str = "ETag";
    pub const IF_MATCH: &str = "If-Match";
    pub const IF_NONE_MATCH: &str = "If-None-Match";
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// Query parameters used by the REST protocol.
pub mod query {
    pub const PRINT: &str = "print";
    /// `print=silent` suppresses the echo of a written value.
    pub const SILENT: &str = "silent";
    pub const AUTH_OVERRIDE: &str = "auth_variable_override";
}

/// Status codes the protocol assigns meaning to.
pub mod status {
    pub const OK: u16 = 200;
    pub const NO_CONTENT: u16 = 204;
    pub const NOT_MODIFIED: u16 = 304;
    pub const PRECONDITION_FAILED: u16 = 412;
}

/// Base location of one database, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    base_url: String,
    auth_override: Option<String>,
}

impl Endpoint {
    /// Create an endpoint for `base_url`, e.g. `https://my-db.example.com`.
    ///
    /// A trailing `/` is trimmed. Only `http` and `https` URLs are accepted.
    pub fn new(base_url: &str) -> ProtocolResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed)
            .map_err(|e| ProtocolError::InvalidUrl(format!("{base_url:?}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProtocolError::InvalidUrl(format!(
                "{base_url:?}: scheme must be http or https"
            )));
        }
        if base.host_str().map_or(true, str::is_empty) {
            return Err(ProtocolError::InvalidUrl(format!("{base_url:?}: missing host")));
        }
        Ok(Self {
            base,
            base_url: trimmed.to_string(),
            auth_override: None,
        })
    }

    /// Attach an `auth_variable_override` (a JSON document) to every request.
    pub fn with_auth_override(mut self, auth_override: Option<String>) -> Self {
        self.auth_override = auth_override;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute REST URL of the node at `path`.
    ///
    /// Each segment is percent-encoded, so keys such as `why?` or `50%off`
    /// address exactly one node.
    pub fn url_for(&self, path: &NodePath) -> ProtocolResult<String> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ProtocolError::InvalidUrl(format!("{}: cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty();
            match path.segments().split_last() {
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{last}.json"));
                }
                None => {
                    segments.push(".json");
                }
            }
        }
        Ok(url.into())
    }

    /// Resolve a node request into a transport request.
    pub fn resolve(&self, request: ApiRequest) -> ProtocolResult<HttpRequest> {
        let mut query = request.query;
        if let Some(auth) = &self.auth_override {
            query.push((query::AUTH_OVERRIDE.to_string(), auth.clone()));
        }
        Ok(HttpRequest {
            method: request.method,
            url: self.url_for(&request.path)?,
            headers: request.headers,
            query,
            body: request.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Method;

    #[test]
    fn trims_trailing_slash() {
        let ep = Endpoint::new("https://db.example.com/").unwrap();
        assert_eq!(ep.base_url(), "https://db.example.com");
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(Endpoint::new("").is_err());
        assert!(Endpoint::new("ftp://db.example.com").is_err());
        assert!(Endpoint::new("https://").is_err());
    }

    #[test]
    fn node_urls() {
        let ep = Endpoint::new("http://localhost:9000").unwrap();
        assert_eq!(
            ep.url_for(&NodePath::root()).unwrap(),
            "http://localhost:9000/.json"
        );
        assert_eq!(
            ep.url_for(&NodePath::parse("users/alice").unwrap()).unwrap(),
            "http://localhost:9000/users/alice.json"
        );
    }

    #[test]
    fn node_urls_keep_base_path() {
        let ep = Endpoint::new("https://db.example.com/tenants/t1/").unwrap();
        assert_eq!(
            ep.url_for(&NodePath::parse("a").unwrap()).unwrap(),
            "https://db.example.com/tenants/t1/a.json"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        let ep = Endpoint::new("https://db.example.com").unwrap();
        let url = ep.url_for(&NodePath::parse("faq/why?").unwrap()).unwrap();
        assert_eq!(url, "https://db.example.com/faq/why%3F.json");

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/faq/why%3F.json");
        assert_eq!(parsed.query(), None);

        let url = ep.url_for(&NodePath::parse("deals/50%off/a b").unwrap()).unwrap();
        assert_eq!(url, "https://db.example.com/deals/50%25off/a%20b.json");
    }

    #[test]
    fn resolve_appends_auth_override() {
        let ep = Endpoint::new("https://db.example.com")
            .unwrap()
            .with_auth_override(Some("{\"uid\":\"svc\"}".into()));
        let req = ApiRequest::new(Method::Get, NodePath::parse("a").unwrap())
            .with_query(query::PRINT, query::SILENT);
        let http = ep.resolve(req).unwrap();
        assert_eq!(http.url, "https://db.example.com/a.json");
        assert_eq!(http.query_param(query::PRINT), Some(query::SILENT));
        assert_eq!(http.query_param(query::AUTH_OVERRIDE), Some("{\"uid\":\"svc\"}"));
    }

    #[test]
    fn protocol_constants() {
        assert_eq!(headers::ETAG_REQUEST, "X-Firebase-ETag");
        assert_eq!(status::PRECONDITION_FAILED, 412);
    }
}
