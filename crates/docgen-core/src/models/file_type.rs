//! File type models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Word OOXML MIME type
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Excel OOXML MIME type
pub const EXCEL_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// PDF MIME type
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Kind of file stored for a template or document.
///
/// Templates are only ever `Docx` or `Excel`; `Pdf` appears on documents
/// generated with `outputFormat: "pdf"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Excel,
    Pdf,
}

impl FileType {
    /// Classify an uploaded template by its file name.
    ///
    /// Only a case-sensitive `.docx` suffix selects `Docx`; every other name
    /// is treated as a spreadsheet. No content sniffing is done.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.ends_with(".docx") {
            FileType::Docx
        } else {
            FileType::Excel
        }
    }

    /// MIME type used when streaming a file of this type
    pub fn content_type(&self) -> &'static str {
        match self {
            FileType::Docx => DOCX_CONTENT_TYPE,
            FileType::Excel => EXCEL_CONTENT_TYPE,
            FileType::Pdf => PDF_CONTENT_TYPE,
        }
    }

    /// File extension (without dot) for generated files
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Docx => "docx",
            FileType::Excel => "xlsx",
            FileType::Pdf => "pdf",
        }
    }

    /// Wire name (`docx`, `excel`, `pdf`)
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Docx => "docx",
            FileType::Excel => "excel",
            FileType::Pdf => "pdf",
        }
    }

    /// Whether a template of this type can be rendered
    pub fn is_template_type(&self) -> bool {
        matches!(self, FileType::Docx | FileType::Excel)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
