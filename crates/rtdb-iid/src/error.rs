use rtdb_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IidError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("instance id {iid:?}: {message} (http status {status})")]
    Backend {
        iid: String,
        status: u16,
        message: String,
    },

    #[error("request failed: {0}")]
    Request(#[from] ProtocolError),
}

pub type IidResult<T> = Result<T, IidError>;
