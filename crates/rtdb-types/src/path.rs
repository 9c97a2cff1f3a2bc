use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PathError, PathResult};
use crate::names::validate_segment;

/// Location of a node in the hierarchical store.
///
/// A `NodePath` is an ordered sequence of non-empty segments. Its canonical
/// string is `/` followed by the segments joined with `/`; the root path has
/// zero segments and renders as `/`. Equality, hashing and ordering all use
/// the canonical string.
#[derive(Clone)]
pub struct NodePath {
    segments: Vec<String>,
    canonical: String,
}

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            canonical: "/".into(),
        }
    }

    /// Parse a slash-delimited path.
    ///
    /// Empty pieces are dropped, so `""`, `"/"` and `"a//b/"` parse to the
    /// root and `/a/b` respectively. Every remaining segment must be a legal
    /// key.
    pub fn parse(path: &str) -> PathResult<Self> {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| validate_segment(s).map(|_| s.to_string()))
            .collect::<PathResult<Vec<_>>>()?;
        Ok(Self::from_segments(segments))
    }

    fn from_segments(segments: Vec<String>) -> Self {
        let canonical = format!("/{}", segments.join("/"));
        Self {
            segments,
            canonical,
        }
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments of this path, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, or `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Canonical string form, always starting with `/`.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Path of a descendant of this node.
    ///
    /// `child` is relative and may span several segments (`"a/b"`), but must
    /// not start with `/`.
    pub fn child(&self, child: &str) -> PathResult<Self> {
        if child.starts_with('/') {
            return Err(PathError::LeadingSlash(child.to_string()));
        }
        let rel = Self::parse(child)?;
        let mut segments = self.segments.clone();
        segments.extend(rel.segments);
        Ok(Self::from_segments(segments))
    }

    /// Path with the last segment removed, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self::from_segments(rest.to_vec()))
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self::root()
    }
}

impl PartialEq for NodePath {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for NodePath {}

impl Hash for NodePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for NodePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({})", self.canonical)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> PathResult<Self> {
        Self::parse(s)
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for NodePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_has_no_segments() {
        let root = NodePath::root();
        assert!(root.is_root());
        assert_eq!(root.as_str(), "/");
        assert_eq!(root.key(), None);
        assert!(root.segments().is_empty());
    }

    #[test]
    fn parse_drops_empty_pieces() {
        assert_eq!(NodePath::parse("").unwrap(), NodePath::root());
        assert_eq!(NodePath::parse("/").unwrap(), NodePath::root());
        assert_eq!(NodePath::parse("//a///b/").unwrap().as_str(), "/a/b");
    }

    #[test]
    fn parse_rejects_illegal_keys() {
        assert!(NodePath::parse("users/a.b").is_err());
        assert!(NodePath::parse("users/$uid").is_err());
        assert!(NodePath::parse("x[0]").is_err());
    }

    #[test]
    fn key_is_last_segment() {
        let p = NodePath::parse("/users/alice/age").unwrap();
        assert_eq!(p.key(), Some("age"));
        assert_eq!(p.segments(), &["users", "alice", "age"]);
    }

    #[test]
    fn child_concatenates() {
        let p = NodePath::parse("users").unwrap();
        assert_eq!(p.child("alice").unwrap().as_str(), "/users/alice");
        assert_eq!(p.child("alice/age").unwrap().as_str(), "/users/alice/age");
        assert_eq!(NodePath::root().child("a").unwrap().as_str(), "/a");
    }

    #[test]
    fn child_rejects_leading_slash() {
        let p = NodePath::parse("users").unwrap();
        let err = p.child("/alice").unwrap_err();
        assert_eq!(err, PathError::LeadingSlash("/alice".into()));
    }

    #[test]
    fn parent_of_root_is_none() {
        assert!(NodePath::root().parent().is_none());
    }

    #[test]
    fn parent_walks_up_to_root() {
        let p = NodePath::parse("a/b").unwrap();
        let parent = p.parent().unwrap();
        assert_eq!(parent.as_str(), "/a");
        assert_eq!(parent.parent().unwrap(), NodePath::root());
    }

    #[test]
    fn equality_by_canonical_string() {
        let a = NodePath::parse("/a/b").unwrap();
        let b = NodePath::parse("a/b/").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, NodePath::parse("a").unwrap());
    }

    #[test]
    fn display_and_from_str() {
        let p: NodePath = "x/y".parse().unwrap();
        assert_eq!(format!("{p}"), "/x/y");
        assert_eq!(format!("{p:?}"), "NodePath(/x/y)");
    }

    #[test]
    fn serde_as_string() {
        let p = NodePath::parse("a/b").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/a/b\"");
        let back: NodePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<NodePath>("\"a.b\"").is_err());
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_-]{1,12}"
    }

    fn path() -> impl Strategy<Value = NodePath> {
        proptest::collection::vec(segment(), 0..6)
            .prop_map(|segs| NodePath::parse(&segs.join("/")).unwrap())
    }

    proptest! {
        #[test]
        fn parent_of_child_is_self(p in path(), s in segment()) {
            let child = p.child(&s).unwrap();
            prop_assert_eq!(child.parent(), Some(p.clone()));
            prop_assert_eq!(child.key(), Some(s.as_str()));
        }

        #[test]
        fn canonical_string_reparses(p in path()) {
            let reparsed = NodePath::parse(p.as_str()).unwrap();
            prop_assert_eq!(reparsed.segments(), p.segments());
            prop_assert!(p.as_str().starts_with('/'));
        }
    }
}
