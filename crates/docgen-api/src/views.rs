//! Response shapes for the template and document endpoints
//!
//! The list endpoints return display-oriented mappings keyed `"Template {id}"`
//! / `"Document {id}"`; the single-item endpoints return normalized camelCase
//! views with computed endpoint links.

use chrono::{DateTime, Utc};
use docgen_core::{Document, FileType, PlaceholderData, StoredFile, Template};
use serde::ser::Serializer;
use serde::Serialize;

/// Prefix under which the API routes are mounted
pub const API_PREFIX: &str = "/api";

/// Shown in place of an empty placeholder list
pub const NO_PLACEHOLDERS: &str = "None";

/// API endpoint that streams a template's file
pub fn template_download_path(id: i64) -> String {
    format!("{}/templates/{}/download", API_PREFIX, id)
}

/// API endpoint that regenerates and streams a document
pub fn document_download_path(id: i64) -> String {
    format!("{}/documents/{}/download", API_PREFIX, id)
}

/// Ordered list of entries serialized as a JSON object
#[derive(Debug)]
pub struct Keyed<T>(pub Vec<(String, T)>);

impl<T: Serialize> Serialize for Keyed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn created_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn created_time(at: &DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

fn display_type(file_type: FileType) -> String {
    file_type.as_str().to_uppercase()
}

// =============================================================================
// Templates
// =============================================================================

/// One entry of `GET /api/templates`
#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Original File")]
    pub original_file: String,
    #[serde(rename = "File Type")]
    pub file_type: String,
    #[serde(rename = "Placeholder Count")]
    pub placeholder_count: usize,
    /// Comma-joined names, or `"None"`
    #[serde(rename = "Placeholders")]
    pub placeholders: String,
    #[serde(rename = "Created Date")]
    pub created_date: String,
    #[serde(rename = "Created Time")]
    pub created_time: String,
    #[serde(rename = "Download URL")]
    pub download_url: String,
}

impl From<&Template> for TemplateSummary {
    fn from(t: &Template) -> Self {
        let placeholders = if t.placeholders.is_empty() {
            NO_PLACEHOLDERS.to_string()
        } else {
            t.placeholders.join(", ")
        };

        Self {
            id: t.id,
            name: t.name.clone(),
            original_file: t.original_file_name.clone(),
            file_type: display_type(t.file_type),
            placeholder_count: t.placeholders.len(),
            placeholders,
            created_date: created_date(&t.created_at),
            created_time: created_time(&t.created_at),
            download_url: t.storage_url.clone(),
        }
    }
}

/// Response for `GET /api/templates`
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    #[serde(rename = "API Status")]
    pub api_status: &'static str,
    #[serde(rename = "Total Templates")]
    pub total: usize,
    #[serde(rename = "Templates")]
    pub templates: Keyed<TemplateSummary>,
}

impl TemplateListResponse {
    pub fn new(templates: &[Template]) -> Self {
        Self {
            api_status: "Success",
            total: templates.len(),
            templates: Keyed(
                templates
                    .iter()
                    .map(|t| (format!("Template {}", t.id), TemplateSummary::from(t)))
                    .collect(),
            ),
        }
    }
}

/// Normalized single-template view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    pub id: i64,
    pub name: String,
    pub original_file_name: String,
    pub file_type: FileType,
    pub placeholders: Vec<String>,
    pub placeholder_count: usize,
    pub storage_url: String,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Template> for TemplateView {
    fn from(t: Template) -> Self {
        Self {
            placeholder_count: t.placeholders.len(),
            download_url: template_download_path(t.id),
            id: t.id,
            name: t.name,
            original_file_name: t.original_file_name,
            file_type: t.file_type,
            placeholders: t.placeholders,
            storage_url: t.storage_url,
            created_at: t.created_at,
        }
    }
}

/// Response for `GET /api/templates/{id}`
#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub template: TemplateView,
}

/// Response for `POST /api/templates`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTemplateResponse {
    pub template: Template,
    pub placeholders: Vec<String>,
    pub storage_file: StoredFile,
}

// =============================================================================
// Documents
// =============================================================================

/// One entry of `GET /api/documents`
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Template ID")]
    pub template_id: i64,
    #[serde(rename = "File Type")]
    pub file_type: String,
    #[serde(rename = "Placeholder Data")]
    pub placeholder_data: PlaceholderData,
    #[serde(rename = "Created Date")]
    pub created_date: String,
    #[serde(rename = "Created Time")]
    pub created_time: String,
    #[serde(rename = "Download URL")]
    pub download_url: String,
    #[serde(rename = "Download Endpoint")]
    pub download_endpoint: String,
}

impl From<&Document> for DocumentSummary {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            template_id: d.template_id,
            file_type: display_type(d.file_type),
            placeholder_data: d.placeholder_data.clone(),
            created_date: created_date(&d.created_at),
            created_time: created_time(&d.created_at),
            download_url: d.storage_url.clone(),
            download_endpoint: document_download_path(d.id),
        }
    }
}

/// Response for `GET /api/documents`
#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    #[serde(rename = "API Status")]
    pub api_status: &'static str,
    #[serde(rename = "Total Documents")]
    pub total: usize,
    #[serde(rename = "Documents")]
    pub documents: Keyed<DocumentSummary>,
}

impl DocumentListResponse {
    pub fn new(documents: &[Document]) -> Self {
        Self {
            api_status: "Success",
            total: documents.len(),
            documents: Keyed(
                documents
                    .iter()
                    .map(|d| (format!("Document {}", d.id), DocumentSummary::from(d)))
                    .collect(),
            ),
        }
    }
}

/// Normalized single-document view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: i64,
    pub template_id: i64,
    pub name: String,
    pub file_type: FileType,
    pub placeholder_data: PlaceholderData,
    pub storage_url: String,
    pub created_at: DateTime<Utc>,
    /// API endpoint that regenerates the file
    pub download_url: String,
    /// Direct URL of the stored file
    pub view_url: String,
}

impl From<Document> for DocumentView {
    fn from(d: Document) -> Self {
        Self {
            download_url: document_download_path(d.id),
            view_url: d.storage_url.clone(),
            id: d.id,
            template_id: d.template_id,
            name: d.name,
            file_type: d.file_type,
            placeholder_data: d.placeholder_data,
            storage_url: d.storage_url,
            created_at: d.created_at,
        }
    }
}

/// Response for `GET /api/documents/{id}`
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub document: DocumentView,
}

/// Response for `POST /api/documents/generate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentResponse {
    pub document: Document,
    /// Direct URL of the stored file
    pub download_url: String,
    pub storage_file: StoredFile,
}

/// Flat entry of `GET /api/documents/template/{template_id}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListEntry {
    #[serde(flatten)]
    pub document: Document,
    pub download_url: String,
}

impl From<Document> for DocumentListEntry {
    fn from(document: Document) -> Self {
        Self {
            download_url: document_download_path(document.id),
            document,
        }
    }
}

/// Response for `GET /api/documents/template/{template_id}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocumentsResponse {
    pub success: bool,
    pub template_id: i64,
    pub count: usize,
    pub documents: Vec<DocumentListEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use docgen_core::{NewDocument, NewTemplate};

    fn template(id: i64, placeholders: &[&str]) -> Template {
        NewTemplate {
            name: "offer".into(),
            original_file_name: "offer.docx".into(),
            file_type: FileType::Docx,
            storage_url: "memory://templates/1-offer.docx".into(),
            storage_id: "1-offer.docx".into(),
            placeholders: placeholders.iter().map(|p| p.to_string()).collect(),
        }
        .into_template(id, Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 30).unwrap())
    }

    #[test]
    fn template_summary_formats_fields() {
        let summary = TemplateSummary::from(&template(4, &["name", "date"]));
        assert_eq!(summary.placeholders, "name, date");
        assert_eq!(summary.placeholder_count, 2);
        assert_eq!(summary.file_type, "DOCX");
        assert_eq!(summary.created_date, "2024-03-09");
        assert_eq!(summary.created_time, "14:05:30");
    }

    #[test]
    fn empty_placeholders_use_sentinel() {
        let summary = TemplateSummary::from(&template(1, &[]));
        assert_eq!(summary.placeholders, NO_PLACEHOLDERS);
        assert_eq!(summary.placeholder_count, 0);
    }

    #[test]
    fn keyed_listing_preserves_storage_order() {
        let templates: Vec<Template> = [2, 10, 1].iter().map(|&id| template(id, &[])).collect();
        let json = serde_json::to_string(&TemplateListResponse::new(&templates)).unwrap();

        let p2 = json.find("\"Template 2\"").unwrap();
        let p10 = json.find("\"Template 10\"").unwrap();
        let p1 = json.find("\"Template 1\"").unwrap();
        assert!(p2 < p10 && p10 < p1);
        assert!(json.contains("\"Total Templates\":3"));
    }

    #[test]
    fn template_view_links_download_endpoint() {
        let view = TemplateView::from(template(9, &["a"]));
        assert_eq!(view.download_url, "/api/templates/9/download");
        assert_eq!(view.placeholder_count, view.placeholders.len());
    }

    #[test]
    fn document_entry_flattens_record() {
        let mut data = PlaceholderData::new();
        data.insert("name".into(), "Ada".into());
        let doc = NewDocument {
            template_id: 9,
            name: "offer_generated.pdf".into(),
            file_type: FileType::Pdf,
            storage_url: "memory://generated-docs/x".into(),
            storage_id: "x".into(),
            placeholder_data: data,
        }
        .into_document(5, Utc::now());

        let json = serde_json::to_value(DocumentListEntry::from(doc)).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["templateId"], 9);
        assert_eq!(json["fileType"], "pdf");
        assert_eq!(json["downloadUrl"], "/api/documents/5/download");
    }
}
