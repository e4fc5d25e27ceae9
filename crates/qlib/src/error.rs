//! Error types for collection, event, cookie and AJAX operations
//!
//! Validation errors are raised before anything is mutated.
//! Multi-element setters are not transactional: a host error on element N
//! leaves elements 0..N already changed.

use qlib_dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Empty collection: '{0}' needs at least one element")]
    EmptyCollection(&'static str),

    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("DOM error: {0}")]
    Dom(DomError),

    #[error("HTTP error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DomError> for Error {
    fn from(err: DomError) -> Self {
        match err {
            DomError::InvalidSelector(selector) => Error::InvalidSelector(selector),
            DomError::MissingCapability(capability) => {
                Error::UnsupportedEnvironment(format!("host lacks {}", capability))
            }
            other => Error::Dom(other),
        }
    }
}
