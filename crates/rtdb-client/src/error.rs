//! Error types for database operations.

use rtdb_protocol::ProtocolError;
use rtdb_types::PathError;
use thiserror::Error;

/// Errors that can occur while talking to the database.
#[derive(Debug, Error)]
pub enum DbError {
    /// Malformed local input, rejected before any network call.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The path or child segment is not well formed.
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Transport failure, cancellation, or deadline expiry.
    #[error("network error: {0}")]
    Network(#[source] ProtocolError),

    /// The backend answered with a status the operation does not accept.
    #[error("http error status: {status}; reason: {message}")]
    Backend { status: u16, message: String },

    /// The transaction's update function declined to produce a value.
    #[error("transaction aborted: {0}")]
    TransactionAborted(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Every conditional write of a transaction lost to a concurrent writer.
    #[error("transaction gave up after {attempts} conflicting attempts")]
    TransactionExhausted { attempts: usize },

    /// A value could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Returns `true` when the whole transaction may succeed if run again,
    /// i.e. it failed only through contention.
    pub fn is_retryable_transaction(&self) -> bool {
        matches!(self, Self::TransactionExhausted { .. })
    }

    /// Returns `true` if the call was cancelled or ran past its deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_cancellation())
    }

    /// HTTP status of a backend error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ProtocolError> for DbError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Backend { status, message } => Self::Backend { status, message },
            ProtocolError::Serialization(msg) => Self::Serialization(msg),
            ProtocolError::Deserialization(msg) => Self::Decode(msg),
            ProtocolError::MissingHeader(name) => {
                Self::Decode(format!("response is missing the {name} header"))
            }
            ProtocolError::InvalidUrl(msg) => Self::Config(msg),
            other => Self::Network(other),
        }
    }
}

/// Convenience type alias for database operations.
pub type DbResult<T> = std::result::Result<T, DbError>;
