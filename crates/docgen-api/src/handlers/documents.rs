//! Document handlers
//!
//! Documents are rendered from a template and a placeholder mapping. The
//! download endpoint never replays the stored file: it renders the template
//! again from the persisted mapping, so a document stays downloadable as long
//! as its template exists.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use bytes::Bytes;
use docgen_core::{
    FileType, NewDocument, OutputFormat, PlaceholderData, ServiceError, ServiceResult, Template,
    DOCUMENTS_BUCKET, TEMPLATES_BUCKET,
};
use serde::Deserialize;
use serde_json::Value;

use super::{file_response, parse_id, storage_key};
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::{
    DocumentListEntry, DocumentListResponse, DocumentResponse, GenerateDocumentResponse,
    TemplateDocumentsResponse,
};

const DOCUMENT_NOT_FOUND: &str = "Document not found";
const TEMPLATE_NOT_FOUND: &str = "Template not found";

/// Template reference as sent by clients: a number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateRef {
    Id(i64),
    Text(String),
}

impl TemplateRef {
    fn as_id(&self) -> Option<i64> {
        match self {
            TemplateRef::Id(id) => Some(*id),
            TemplateRef::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Request body for POST /api/documents/generate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    #[serde(default)]
    pub template_id: Option<TemplateRef>,
    #[serde(default)]
    pub placeholder_data: Option<BTreeMap<String, Value>>,
    /// `"pdf"` converts the result; anything else keeps the template format
    #[serde(default)]
    pub output_format: Option<String>,
}

/// Flatten JSON values to the strings substituted into a template
fn placeholder_values(raw: BTreeMap<String, Value>) -> PlaceholderData {
    raw.into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, value)
        })
        .collect()
}

/// Name of a document generated from `template` as `file_type`
fn document_name(template: &Template, file_type: FileType) -> String {
    format!("{}_generated.{}", template.name, file_type.extension())
}

/// Render `template` with `data` and convert to PDF when `target` is `Pdf`.
///
/// Shared by generate and download so both produce the same bytes for the
/// same inputs.
async fn render_document(
    state: &AppState,
    template: &Template,
    data: &PlaceholderData,
    target: FileType,
) -> ServiceResult<Bytes> {
    if !template.file_type.is_template_type() {
        return Err(ServiceError::InvalidRequest(format!(
            "Unsupported template file type: {}",
            template.file_type
        )));
    }

    let key = template.blob_key().ok_or_else(|| {
        ServiceError::Internal(format!("Template {} has no blob key", template.id))
    })?;

    let source = state.blobs().download_file(TEMPLATES_BUCKET, &key).await?;

    let rendered = state
        .processor()
        .render(template.file_type, &source, data)
        .await?;

    if target == FileType::Pdf {
        return state
            .processor()
            .convert_to_pdf(&rendered, template.file_type)
            .await;
    }

    Ok(rendered)
}

/// GET /api/documents
/// List all documents as a display mapping
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let documents = state
        .storage()
        .get_all_documents()
        .await
        .map_err(ApiError::service("Failed to fetch documents"))?;

    Ok(Json(DocumentListResponse::new(&documents)))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let id = parse_id(&id, DOCUMENT_NOT_FOUND)?;

    let document = state
        .storage()
        .get_document(id)
        .await
        .map_err(ApiError::service("Failed to fetch document"))?
        .ok_or_else(|| ApiError::NotFound(DOCUMENT_NOT_FOUND.to_string()))?;

    Ok(Json(DocumentResponse {
        success: true,
        document: document.into(),
    }))
}

/// POST /api/documents/generate
/// Render a template with placeholder values, optionally convert to PDF,
/// and store the result
pub async fn generate_document(
    State(state): State<AppState>,
    payload: Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateDocumentResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (Some(template_ref), Some(raw_data)) = (request.template_id, request.placeholder_data)
    else {
        return Err(ApiError::BadRequest(
            "templateId and placeholderData are required".to_string(),
        ));
    };

    let output_format = OutputFormat::from_request(request.output_format.as_deref());
    let placeholder_data = placeholder_values(raw_data);

    let template_id = template_ref
        .as_id()
        .ok_or_else(|| ApiError::NotFound(TEMPLATE_NOT_FOUND.to_string()))?;

    let template = state
        .storage()
        .get_template(template_id)
        .await
        .map_err(ApiError::service("Failed to generate document"))?
        .ok_or_else(|| ApiError::NotFound(TEMPLATE_NOT_FOUND.to_string()))?;

    let file_type = output_format.resolve(template.file_type);

    let buffer = render_document(&state, &template, &placeholder_data, file_type)
        .await
        .map_err(ApiError::service("Failed to generate document"))?;

    let name = document_name(&template, file_type);
    let key = storage_key(&name);

    let stored = state
        .blobs()
        .upload_file(buffer, DOCUMENTS_BUCKET, &key)
        .await
        .map_err(ApiError::service("Failed to generate document"))?;

    let document = state
        .storage()
        .create_document(NewDocument {
            template_id: template.id,
            name,
            file_type,
            storage_url: stored.url.clone(),
            storage_id: stored.storage_id.clone(),
            placeholder_data,
        })
        .await
        .map_err(ApiError::service("Failed to generate document"))?;

    tracing::info!(
        document_id = document.id,
        template_id = template.id,
        file_type = %file_type,
        "Document generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateDocumentResponse {
            download_url: stored.url.clone(),
            document,
            storage_file: stored,
        }),
    ))
}

/// GET /api/documents/{id}/download
/// Regenerate a document from its template and stream it
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, DOCUMENT_NOT_FOUND)?;

    let document = state
        .storage()
        .get_document(id)
        .await
        .map_err(ApiError::service("Failed to download document"))?
        .ok_or_else(|| ApiError::NotFound(DOCUMENT_NOT_FOUND.to_string()))?;

    let template = state
        .storage()
        .get_template(document.template_id)
        .await
        .map_err(ApiError::service("Failed to download document"))?
        .ok_or_else(|| ApiError::NotFound(TEMPLATE_NOT_FOUND.to_string()))?;

    let buffer = match render_document(
        &state,
        &template,
        &document.placeholder_data,
        document.file_type,
    )
    .await
    {
        Ok(buffer) => buffer,
        Err(ServiceError::InvalidRequest(msg)) => return Err(ApiError::BadRequest(msg)),
        Err(err) => {
            tracing::error!(
                document_id = id,
                template_id = template.id,
                error = %err,
                "Document regeneration failed"
            );
            return Err(ApiError::Internal("Failed to download document".to_string()));
        }
    };

    tracing::debug!(document_id = id, size = buffer.len(), "Document regenerated");

    file_response(buffer, document.file_type, &document.name)
}

/// GET /api/documents/template/{template_id}
/// List the documents generated from one template
pub async fn list_documents_by_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateDocumentsResponse>, ApiError> {
    let template_id = template_id
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid template id".to_string()))?;

    let documents = state
        .storage()
        .get_documents_by_template(template_id)
        .await
        .map_err(ApiError::service("Failed to fetch documents"))?;

    let documents: Vec<DocumentListEntry> = documents.into_iter().map(Into::into).collect();

    Ok(Json(TemplateDocumentsResponse {
        success: true,
        template_id,
        count: documents.len(),
        documents,
    }))
}
