use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use rtdb_protocol::{
    classify, status, CallContext, HttpRequest, Method, Outcome, ProtocolError, Transport,
};

use crate::error::{IidError, IidResult};

pub const DEFAULT_ENDPOINT: &str = "https://console.firebase.google.com/v1";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceIdConfig {
    pub project_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

impl InstanceIdConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            endpoint: default_endpoint(),
        }
    }
}

/// Client for the instance ID service of one project.
#[derive(Clone)]
pub struct InstanceIdClient {
    endpoint: Url,
    project: String,
    transport: Arc<dyn Transport>,
}

impl InstanceIdClient {
    pub fn new(config: &InstanceIdConfig, transport: Arc<dyn Transport>) -> IidResult<Self> {
        if config.project_id.is_empty() {
            return Err(IidError::Validation(
                "project id is required to access instance id client".into(),
            ));
        }
        let endpoint = Url::parse(config.endpoint.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                IidError::Validation(format!("invalid instance id endpoint: {:?}", config.endpoint))
            })?;
        Ok(Self {
            endpoint,
            project: config.project_id.clone(),
            transport,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Delete `iid` and the data associated with it.
    pub async fn delete_instance_id(&self, ctx: &CallContext, iid: &str) -> IidResult<()> {
        if iid.is_empty() {
            return Err(IidError::Validation("instance id must not be empty".into()));
        }

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| IidError::Validation("instance id endpoint cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["project", self.project.as_str(), "instanceId", iid]);
        debug!(%url, "deleting instance id");
        let response = ctx
            .run(self.transport.execute(HttpRequest::new(Method::Delete, url)))
            .await?;

        match classify(response, status::OK) {
            Ok(Outcome::Ok { .. }) => {
                info!(project = %self.project, iid, "instance id deleted");
                Ok(())
            }
            Ok(Outcome::PreconditionFailed { .. }) => {
                Err(backend_error(iid, status::PRECONDITION_FAILED, None))
            }
            Ok(Outcome::NotModified { .. }) => Err(backend_error(iid, status::NOT_MODIFIED, None)),
            Err(ProtocolError::Backend { status, message }) => {
                Err(backend_error(iid, status, Some(message)))
            }
            Err(other) => Err(other.into()),
        }
    }
}

impl std::fmt::Debug for InstanceIdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceIdClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

fn backend_error(iid: &str, code: u16, backend: Option<String>) -> IidError {
    let message = match code {
        400 => "malformed instance id argument".to_string(),
        401 => "request not authorized".to_string(),
        403 => "project does not match instance id or the client does not have sufficient \
                privileges"
            .to_string(),
        404 => "failed to find the instance id".to_string(),
        409 => "already deleted".to_string(),
        429 => "request throttled out by the backend server".to_string(),
        500 => "internal server error".to_string(),
        503 => "backend servers are over capacity; try again later".to_string(),
        _ => backend.unwrap_or_else(|| "unexpected response".to_string()),
    };
    IidError::Backend {
        iid: iid.to_string(),
        status: code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtdb_protocol::{HttpResponse, ScriptedTransport};
    use serde_json::json;

    fn fixture() -> (Arc<ScriptedTransport>, InstanceIdClient) {
        let transport = Arc::new(ScriptedTransport::new());
        let config = InstanceIdConfig {
            project_id: "test-project".into(),
            endpoint: "https://iid.example.com/v1/".into(),
        };
        let client = InstanceIdClient::new(&config, transport.clone()).unwrap();
        (transport, client)
    }

    #[test]
    fn requires_project_id() {
        let err = InstanceIdClient::new(
            &InstanceIdConfig::new(""),
            Arc::new(ScriptedTransport::new()),
        )
        .unwrap_err();
        assert!(matches!(err, IidError::Validation(_)));
    }

    #[test]
    fn config_defaults_endpoint() {
        let c: InstanceIdConfig = toml::from_str("project_id = \"p\"").unwrap();
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c, InstanceIdConfig::new("p"));
    }

    #[test]
    fn rejects_malformed_endpoint() {
        let config = InstanceIdConfig {
            project_id: "p".into(),
            endpoint: "not a url".into(),
        };
        let err = InstanceIdClient::new(&config, Arc::new(ScriptedTransport::new())).unwrap_err();
        assert!(matches!(err, IidError::Validation(_)));
    }

    #[tokio::test]
    async fn instance_id_is_one_path_segment() {
        let (t, client) = fixture();
        t.push_response(HttpResponse::json(200, &json!({})));
        client
            .delete_instance_id(&CallContext::background(), "a/b?c")
            .await
            .unwrap();
        assert_eq!(
            t.requests()[0].url,
            "https://iid.example.com/v1/project/test-project/instanceId/a%2Fb%3Fc"
        );
    }

    #[tokio::test]
    async fn rejects_empty_id_without_network() {
        let (t, client) = fixture();
        let err = client
            .delete_instance_id(&CallContext::background(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, IidError::Validation(_)));
        assert_eq!(t.request_count(), 0);
    }

    #[tokio::test]
    async fn deletes_instance_id() {
        let (t, client) = fixture();
        t.push_response(HttpResponse::json(200, &json!({})));
        client
            .delete_instance_id(&CallContext::background(), "test-iid")
            .await
            .unwrap();

        let sent = &t.requests()[0];
        assert_eq!(sent.method, Method::Delete);
        assert_eq!(
            sent.url,
            "https://iid.example.com/v1/project/test-project/instanceId/test-iid"
        );
    }

    #[tokio::test]
    async fn maps_known_statuses() {
        let (t, client) = fixture();
        t.push_response(HttpResponse::json(404, &json!({})));
        match client
            .delete_instance_id(&CallContext::background(), "gone")
            .await
            .unwrap_err()
        {
            IidError::Backend { iid, status, message } => {
                assert_eq!(iid, "gone");
                assert_eq!(status, 404);
                assert_eq!(message, "failed to find the instance id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_status_keeps_backend_message() {
        let (t, client) = fixture();
        t.push_response(HttpResponse::json(418, &json!({"error": "teapot"})));
        match client
            .delete_instance_id(&CallContext::background(), "x")
            .await
            .unwrap_err()
        {
            IidError::Backend { status, message, .. } => {
                assert_eq!(status, 418);
                assert_eq!(message, "teapot");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_request_error() {
        let (t, client) = fixture();
        t.push_failure("connection refused");
        let err = client
            .delete_instance_id(&CallContext::background(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, IidError::Request(ProtocolError::Transport(_))));
    }
}
