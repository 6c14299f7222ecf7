use thiserror::Error;

use catalog::CatalogError;
use forge::ServiceError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer. `message` is the body's `error` field when there is one.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, message } => ServiceError::Rejected { status, message },
            ClientError::Decode(msg) => ServiceError::Decode(msg),
            ClientError::Http(e) if e.is_decode() => ServiceError::Decode(e.to_string()),
            other => ServiceError::Transport(other.to_string()),
        }
    }
}

impl From<ClientError> for CatalogError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Decode(msg) => CatalogError::Malformed(msg),
            other => CatalogError::Unavailable(other.to_string()),
        }
    }
}
