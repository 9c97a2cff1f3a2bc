use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("call cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("http error status: {status}; reason: {message}")]
    Backend { status: u16, message: String },

    #[error("missing response header: {0}")]
    MissingHeader(String),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl ProtocolError {
    /// Returns `true` for cancellation and deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
