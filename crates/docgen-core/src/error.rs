//! Common error types for docgen collaborators

use thiserror::Error;

/// Result type for collaborator operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised by storage, blob store and document processor implementations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Record or object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request cannot be served with the given input (e.g. unsupported file type)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Placeholder extraction or template rendering failed
    #[error("Template processing failed: {0}")]
    Processing(String),

    /// PDF conversion failed
    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    /// Blob or metadata storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Transport/communication error with a remote collaborator
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
