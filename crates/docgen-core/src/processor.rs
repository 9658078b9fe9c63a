//! DocumentProcessor trait - placeholder extraction, rendering and PDF conversion

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{FileType, PlaceholderData};

/// Format-aware operations on template files.
///
/// Implementations own all knowledge of the binary formats; the HTTP layer
/// only picks the docx or excel path from a template's [`FileType`].
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// Placeholder names in a Word document, unique, in first-appearance order
    async fn extract_placeholders_from_docx(&self, buffer: &[u8]) -> ServiceResult<Vec<String>>;

    /// Placeholder names in a spreadsheet, unique, in first-appearance order
    async fn extract_placeholders_from_excel(&self, buffer: &[u8])
        -> ServiceResult<Vec<String>>;

    /// Render a Word template with the given values
    async fn process_docx_template(
        &self,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes>;

    /// Render a spreadsheet template with the given values
    async fn process_excel_template(
        &self,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes>;

    /// Convert a rendered file of `source_type` to PDF
    async fn convert_to_pdf(&self, buffer: &[u8], source_type: FileType) -> ServiceResult<Bytes>;

    /// Extract placeholders through the path matching `file_type`
    async fn extract_placeholders(
        &self,
        file_type: FileType,
        buffer: &[u8],
    ) -> ServiceResult<Vec<String>> {
        match file_type {
            FileType::Docx => self.extract_placeholders_from_docx(buffer).await,
            FileType::Excel => self.extract_placeholders_from_excel(buffer).await,
            FileType::Pdf => Err(unsupported(file_type)),
        }
    }

    /// Render a template through the path matching `file_type`
    async fn render(
        &self,
        file_type: FileType,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes> {
        match file_type {
            FileType::Docx => self.process_docx_template(buffer, data).await,
            FileType::Excel => self.process_excel_template(buffer, data).await,
            FileType::Pdf => Err(unsupported(file_type)),
        }
    }
}

fn unsupported(file_type: FileType) -> ServiceError {
    ServiceError::InvalidRequest(format!("Unsupported template file type: {}", file_type))
}
