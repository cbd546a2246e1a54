use http::StatusCode;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("network error: {0}")]
    Network(String),
    #[error("encode/decode error: {0}")]
    Serde(String),
    #[error("unknown error")]
    Unknown,
}

impl BackendError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("unsupported value: {0}")]
    Unsupported(String),
}
