//! Template models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FileType;
use crate::blob::blob_key_from_url;

/// An uploaded master document or spreadsheet containing placeholder tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique identifier, assigned by storage
    pub id: i64,
    /// Display name
    pub name: String,
    /// File name as uploaded
    pub original_file_name: String,
    /// `docx` or `excel`
    pub file_type: FileType,
    /// Fetchable URL of the stored blob
    pub storage_url: String,
    /// Blob key in the templates bucket
    pub storage_id: String,
    /// Placeholder names found at upload, in first-appearance order
    pub placeholders: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Template {
    /// Key of the template's blob in the templates bucket.
    ///
    /// `storage_id` is authoritative. Records written without one fall back
    /// to the last segment of `storage_url`.
    pub fn blob_key(&self) -> Option<String> {
        if !self.storage_id.is_empty() {
            return Some(self.storage_id.clone());
        }
        blob_key_from_url(&self.storage_url)
    }
}

/// Fields needed to persist a new template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub original_file_name: String,
    pub file_type: FileType,
    pub storage_url: String,
    pub storage_id: String,
    pub placeholders: Vec<String>,
}

impl NewTemplate {
    /// Attach storage-assigned fields
    pub fn into_template(self, id: i64, created_at: DateTime<Utc>) -> Template {
        Template {
            id,
            name: self.name,
            original_file_name: self.original_file_name,
            file_type: self.file_type,
            storage_url: self.storage_url,
            storage_id: self.storage_id,
            placeholders: self.placeholders,
            created_at,
        }
    }
}
