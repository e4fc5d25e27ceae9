//! Error types for host document operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Node is not an element: {0}")]
    NotAnElement(String),

    #[error("Missing host capability: {0}")]
    MissingCapability(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
