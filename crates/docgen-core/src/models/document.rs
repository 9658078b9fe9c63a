//! Generated document models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FileType;

/// Placeholder name to substituted value.
///
/// Ordered so that re-rendering from a persisted document is deterministic.
pub type PlaceholderData = BTreeMap<String, String>;

/// A document produced by filling a template's placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    /// Template this document was generated from (not enforced)
    pub template_id: i64,
    pub name: String,
    /// `docx`, `excel` or `pdf`
    pub file_type: FileType,
    pub storage_url: String,
    pub storage_id: String,
    /// Values used at generation time; enough to regenerate the document
    pub placeholder_data: PlaceholderData,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to persist a new document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub template_id: i64,
    pub name: String,
    pub file_type: FileType,
    pub storage_url: String,
    pub storage_id: String,
    pub placeholder_data: PlaceholderData,
}

impl NewDocument {
    /// Attach storage-assigned fields
    pub fn into_document(self, id: i64, created_at: DateTime<Utc>) -> Document {
        Document {
            id,
            template_id: self.template_id,
            name: self.name,
            file_type: self.file_type,
            storage_url: self.storage_url,
            storage_id: self.storage_id,
            placeholder_data: self.placeholder_data,
            created_at,
        }
    }
}

/// Requested output of a generate call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Keep the template's own format
    #[default]
    Original,
    /// Convert the rendered file to PDF
    Pdf,
}

impl OutputFormat {
    /// Parse the `outputFormat` request field.
    ///
    /// Only the literal `"pdf"` requests conversion; anything else, including
    /// a missing value, keeps the original format.
    pub fn from_request(value: Option<&str>) -> Self {
        match value {
            Some("pdf") => OutputFormat::Pdf,
            _ => OutputFormat::Original,
        }
    }

    /// File type of the generated document for a template of `template_type`
    pub fn resolve(&self, template_type: FileType) -> FileType {
        match self {
            OutputFormat::Original => template_type,
            OutputFormat::Pdf => FileType::Pdf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_defaults_to_original() {
        assert_eq!(OutputFormat::from_request(None), OutputFormat::Original);
        assert_eq!(
            OutputFormat::from_request(Some("original")),
            OutputFormat::Original
        );
        assert_eq!(OutputFormat::from_request(Some("PDF")), OutputFormat::Original);
        assert_eq!(OutputFormat::from_request(Some("pdf")), OutputFormat::Pdf);
    }

    #[test]
    fn resolve_keeps_template_type_unless_pdf() {
        assert_eq!(OutputFormat::Original.resolve(FileType::Excel), FileType::Excel);
        assert_eq!(OutputFormat::Pdf.resolve(FileType::Docx), FileType::Pdf);
    }

    #[test]
    fn placeholder_data_round_trips_as_object() {
        let mut data = PlaceholderData::new();
        data.insert("name".into(), "Ada".into());
        let doc = NewDocument {
            template_id: 3,
            name: "letter_generated.docx".into(),
            file_type: FileType::Docx,
            storage_url: "memory://generated-docs/x".into(),
            storage_id: "x".into(),
            placeholder_data: data,
        }
        .into_document(1, Utc::now());

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["templateId"], 3);
        assert_eq!(json["placeholderData"]["name"], "Ada");
    }
}
