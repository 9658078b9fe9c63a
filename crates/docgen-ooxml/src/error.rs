//! Error types for the OOXML processor

use docgen_core::ServiceError;
use thiserror::Error;

/// Errors that can occur while reading, rendering or converting a template
#[derive(Debug, Error)]
pub enum OoxmlError {
    #[error("Invalid zip container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Part {part} is not valid UTF-8")]
    Encoding { part: String },

    #[error("No {0} found in container")]
    MissingPart(&'static str),

    #[error("PDF conversion failed: {0}")]
    Conversion(String),
}

pub type Result<T> = std::result::Result<T, OoxmlError>;

impl From<OoxmlError> for ServiceError {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Conversion(msg) => ServiceError::Conversion(msg),
            OoxmlError::Pattern(e) => ServiceError::Internal(e.to_string()),
            other => ServiceError::Processing(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_errors_keep_their_kind() {
        let err: ServiceError = OoxmlError::Conversion("soffice exited with 1".into()).into();
        assert!(matches!(err, ServiceError::Conversion(m) if m == "soffice exited with 1"));
    }

    #[test]
    fn container_errors_are_processing_errors() {
        let err: ServiceError = OoxmlError::MissingPart("word/document.xml").into();
        assert!(matches!(err, ServiceError::Processing(_)));

        let err: ServiceError = OoxmlError::Encoding {
            part: "xl/sharedStrings.xml".into(),
        }
        .into();
        assert!(err.to_string().contains("xl/sharedStrings.xml"));
    }
}
