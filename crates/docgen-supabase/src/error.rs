//! Error types for Supabase Storage operations

use docgen_core::ServiceError;
use thiserror::Error;

/// Result type alias for Supabase operations
pub type Result<T> = std::result::Result<T, SupabaseError>;

/// Errors that can occur while talking to Supabase Storage
#[derive(Error, Debug)]
pub enum SupabaseError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid project URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Service key cannot be sent as a header
    #[error("Invalid service key: {0}")]
    InvalidKey(String),

    /// Storage API returned an error response
    #[error("Storage API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl SupabaseError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

impl From<SupabaseError> for ServiceError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Http(e) => ServiceError::Transport(e.to_string()),
            SupabaseError::InvalidUrl(_) | SupabaseError::InvalidKey(_) => {
                ServiceError::Internal(err.to_string())
            }
            SupabaseError::Api { .. } | SupabaseError::Parse(_) => {
                ServiceError::Storage(err.to_string())
            }
        }
    }
}
