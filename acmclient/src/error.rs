use acmcore::error::BackendError;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid base url: {0}")]
    BaseUrl(String),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

pub(crate) fn backend_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::Serde(e.to_string())
    } else if let Some(status) = e.status() {
        BackendError::Status(status)
    } else {
        BackendError::Network(e.to_string())
    }
}
