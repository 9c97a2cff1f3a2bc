use std::sync::Arc;

use rtdb_protocol::{Adapter, AuthMethod, Endpoint, HttpTransport, Transport};
use rtdb_types::NodePath;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::DbResult;
use crate::reference::Reference;

/// Entry point to one database.
///
/// Holds the endpoint and transport shared by every [`Reference`] it hands
/// out. Cloning is cheap and clones share the same transport.
#[derive(Clone, Debug)]
pub struct DatabaseClient {
    adapter: Arc<Adapter>,
}

impl DatabaseClient {
    /// Create a client that sends requests through `transport`.
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> DbResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        info!(url = endpoint.base_url(), "database client created");
        Ok(Self::with_endpoint(endpoint, transport))
    }

    /// Create a client over HTTP with the given credentials.
    pub fn connect(config: &ClientConfig, auth: AuthMethod) -> DbResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(auth, config.request_timeout(), &config.user_agent)?;
        Self::new(config, Arc::new(transport))
    }

    pub fn with_endpoint(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            adapter: Arc::new(Adapter::new(endpoint, transport)),
        }
    }

    /// Reference to the node at `path`. Empty pieces are ignored, so `""`
    /// and `"/"` both address the root.
    pub fn reference(&self, path: &str) -> DbResult<Reference> {
        let path = NodePath::parse(path)?;
        Ok(Reference::new(self.clone(), path))
    }

    /// Reference to the root of the database.
    pub fn root(&self) -> Reference {
        Reference::new(self.clone(), NodePath::root())
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.adapter.endpoint()
    }

    pub(crate) fn adapter(&self) -> &Adapter {
        &self.adapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use rtdb_protocol::ScriptedTransport;

    fn client() -> DatabaseClient {
        DatabaseClient::new(
            &ClientConfig::new("https://db.example.com"),
            Arc::new(ScriptedTransport::new()),
        )
        .unwrap()
    }

    #[test]
    fn references_by_path() {
        let c = client();
        let r = c.reference("/users/alice").unwrap();
        assert_eq!(r.path().as_str(), "/users/alice");
        assert_eq!(r.key(), Some("alice"));
        assert_eq!(c.reference("").unwrap(), c.root());
        assert_eq!(c.reference("/").unwrap(), c.root());
    }

    #[test]
    fn rejects_illegal_paths() {
        let err = client().reference("users/a.b").unwrap_err();
        assert!(matches!(err, DbError::Path(_)));
    }

    #[test]
    fn rejects_invalid_config() {
        let err = DatabaseClient::new(
            &ClientConfig::new("not a url"),
            Arc::new(ScriptedTransport::new()),
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }

    #[test]
    fn connect_builds_http_transport() {
        let c = DatabaseClient::connect(
            &ClientConfig::new("https://db.example.com"),
            AuthMethod::Bearer("token".into()),
        )
        .unwrap();
        assert_eq!(c.endpoint().base_url(), "https://db.example.com");
    }
}
