//! Template handlers
//!
//! Upload extracts placeholders and stores the raw file; download streams the
//! stored file back untouched.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use bytes::Bytes;
use docgen_core::{FileType, NewTemplate, TEMPLATES_BUCKET};

use super::{file_response, parse_id, storage_key};
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::{TemplateListResponse, TemplateResponse, UploadTemplateResponse};

const TEMPLATE_NOT_FOUND: &str = "Template not found";

/// Uploaded file taken from the `file` multipart field
struct UploadedFile {
    file_name: String,
    data: Bytes,
}

/// Display name for a template: the file name without its extension
fn display_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// A multipart body that could not be read; oversized bodies are 413
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!(error = %err, "Upload exceeds body limit");
        ApiError::PayloadTooLarge("Uploaded file is too large".to_string())
    } else {
        tracing::debug!(error = %err, "Unreadable multipart body");
        ApiError::BadRequest("Failed to read uploaded file".to_string())
    }
}

/// Read the first `file` field that carries a file name
async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        return Ok(Some(UploadedFile { file_name, data }));
    }
    Ok(None)
}

/// GET /api/templates
/// List all templates as a display mapping
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, ApiError> {
    let templates = state
        .storage()
        .get_all_templates()
        .await
        .map_err(ApiError::service("Failed to fetch templates"))?;

    Ok(Json(TemplateListResponse::new(&templates)))
}

/// GET /api/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let id = parse_id(&id, TEMPLATE_NOT_FOUND)?;

    let template = state
        .storage()
        .get_template(id)
        .await
        .map_err(ApiError::service("Failed to fetch template"))?
        .ok_or_else(|| ApiError::NotFound(TEMPLATE_NOT_FOUND.to_string()))?;

    Ok(Json(TemplateResponse {
        success: true,
        template: template.into(),
    }))
}

/// POST /api/templates
/// Upload a template (multipart field `file`), extract its placeholders and
/// store it
pub async fn upload_template(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadTemplateResponse>), ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload without multipart body");
        ApiError::BadRequest("No file uploaded".to_string())
    })?;

    let UploadedFile { file_name, data } = read_file_field(multipart)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let file_type = FileType::from_file_name(&file_name);

    let placeholders = state
        .processor()
        .extract_placeholders(file_type, &data)
        .await
        .map_err(ApiError::service("Failed to upload template"))?;

    let key = storage_key(&file_name);
    let stored = state
        .blobs()
        .upload_file(data.clone(), TEMPLATES_BUCKET, &key)
        .await
        .map_err(ApiError::service("Failed to upload template"))?;

    let template = state
        .storage()
        .create_template(NewTemplate {
            name: display_name(&file_name),
            original_file_name: file_name,
            file_type,
            storage_url: stored.url.clone(),
            storage_id: stored.storage_id.clone(),
            placeholders: placeholders.clone(),
        })
        .await
        .map_err(ApiError::service("Failed to upload template"))?;

    tracing::info!(
        template_id = template.id,
        file_type = %file_type,
        placeholders = placeholders.len(),
        size = data.len(),
        "Template uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadTemplateResponse {
            template,
            placeholders,
            storage_file: stored,
        }),
    ))
}

/// GET /api/templates/{id}/download
/// Stream the stored template file
pub async fn download_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, TEMPLATE_NOT_FOUND)?;

    let template = state
        .storage()
        .get_template(id)
        .await
        .map_err(ApiError::service("Failed to download template"))?
        .ok_or_else(|| ApiError::NotFound(TEMPLATE_NOT_FOUND.to_string()))?;

    let key = template.blob_key().ok_or_else(|| {
        tracing::error!(template_id = id, "Template has no blob key");
        ApiError::Internal("Failed to download template".to_string())
    })?;

    let data = state
        .blobs()
        .download_file(TEMPLATES_BUCKET, &key)
        .await
        .map_err(ApiError::service("Failed to download template"))?;

    tracing::debug!(template_id = id, size = data.len(), "Template downloaded");

    file_response(data, template.file_type, &template.original_file_name)
}
