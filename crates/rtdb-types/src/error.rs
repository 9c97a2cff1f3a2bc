use thiserror::Error;

/// Errors produced while building or composing node paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("child path must not start with '/': {0:?}")]
    LeadingSlash(String),

    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidSegment { segment: String, reason: String },
}

/// Convenience type alias for path operations.
pub type PathResult<T> = std::result::Result<T, PathError>;
