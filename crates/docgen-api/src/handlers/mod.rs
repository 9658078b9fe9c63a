//! HTTP request handlers for the docgen API
//!
//! These handlers only use the collaborator traits from `docgen-core`.

pub mod documents;
pub mod templates;

use std::sync::atomic::{AtomicI64, Ordering};

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use docgen_core::blob::encode_object_name;
use docgen_core::FileType;

use crate::error::ApiError;

/// Parse a numeric path id. Anything that is not an integer cannot name a
/// record, so it is reported as `not_found_message`.
pub(crate) fn parse_id(raw: &str, not_found_message: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::NotFound(not_found_message.to_string()))
}

static LAST_KEY_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Blob key for a new object: `{millis}-{file_name}`.
///
/// The timestamp never repeats within the process, so two writes of the same
/// name in one millisecond still get distinct keys.
pub(crate) fn storage_key(file_name: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let millis = match LAST_KEY_MILLIS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last + 1))
    }) {
        Ok(last) | Err(last) => now.max(last + 1),
    };
    format!("{}-{}", millis, file_name)
}

/// `Content-Disposition` value for an attachment named `file_name`.
///
/// The plain `filename` parameter carries an ASCII fallback; the exact name
/// goes in the RFC 5987 `filename*` parameter.
pub(crate) fn attachment_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        encode_object_name(file_name)
    )
}

/// Binary response with the content type of `file_type`
pub(crate) fn file_response(
    data: Bytes,
    file_type: FileType,
    file_name: &str,
) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file_type.content_type())
        .header(header::CONTENT_DISPOSITION, attachment_disposition(file_name))
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| {
            tracing::error!(error = %e, file_name, "Failed to build file response");
            ApiError::Internal("Failed to build file response".to_string())
        })
}
