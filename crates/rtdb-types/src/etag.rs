use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque version token for the value stored at one path.
///
/// The token is kept exactly as the backend sent it, quotes included, and is
/// only meaningful together with the path it was read from.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, suitable for `If-Match` / `If-None-Match`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ETag({})", self.0)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ETag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ETag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_token_verbatim() {
        let tag = ETag::new("\"v2\"");
        assert_eq!(tag.as_str(), "\"v2\"");
        assert_eq!(tag.to_string(), "\"v2\"");
    }

    #[test]
    fn serde_is_transparent() {
        let tag = ETag::from("abc");
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"abc\"");
    }
}
