use serde::{Deserialize, Serialize};

/// Credentials attached by [`HttpTransport`](crate::HttpTransport).
///
/// Token acquisition and refresh happen outside this crate; the transport
/// only forwards what it is given.
#[derive(Clone, Serialize, Deserialize, Default)]
pub enum AuthMethod {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    #[default]
    Anonymous,
}

impl AuthMethod {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer-token",
            Self::Anonymous => "anonymous",
        }
    }

    /// Value of the `Authorization` header, if any.
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("Bearer {token}")),
            Self::Anonymous => None,
        }
    }
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print tokens
        f.write_str(self.display_name())
    }
}
