//! BlobStore trait - raw file storage addressed by bucket + file name

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Bucket holding uploaded templates
pub const TEMPLATES_BUCKET: &str = "templates";
/// Bucket holding generated documents
pub const DOCUMENTS_BUCKET: &str = "generated-docs";

/// Characters left unescaped in an object name used as a URL path segment
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Result of storing a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Fetchable URL of the stored object
    pub url: String,
    /// Object name inside the bucket (the blob key)
    pub storage_id: String,
    /// Bucket the object was written to
    pub bucket: String,
    /// Store-specific object path, when the store reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Object storage used for template and generated document files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `buffer` as `file_name` in `bucket`
    async fn upload_file(
        &self,
        buffer: Bytes,
        bucket: &str,
        file_name: &str,
    ) -> ServiceResult<StoredFile>;

    /// Fetch the object `file_name` from `bucket`
    async fn download_file(&self, bucket: &str, file_name: &str) -> ServiceResult<Bytes>;
}

/// Percent-encode an object name so it forms a single URL path segment
pub fn encode_object_name(name: &str) -> String {
    utf8_percent_encode(name, OBJECT_NAME).to_string()
}

/// Derive a blob key from a stored URL: the last `/`-separated segment,
/// percent-decoded.
///
/// ```
/// # use docgen_core::blob::blob_key_from_url;
/// assert_eq!(
///     blob_key_from_url("https://h/storage/v1/object/public/templates/1-a%20b.docx"),
///     Some("1-a b.docx".to_string())
/// );
/// assert_eq!(blob_key_from_url("https://h/templates/"), None);
/// ```
pub fn blob_key_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// In-process blob store.
///
/// Used when no remote store is configured and in tests. URLs take the form
/// `memory://{bucket}/{encoded name}`.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete an object, returning whether it existed
    pub fn remove(&self, bucket: &str, file_name: &str) -> bool {
        self.objects
            .write()
            .remove(&(bucket.to_string(), file_name.to_string()))
            .is_some()
    }

    /// Number of objects stored in `bucket`
    pub fn count(&self, bucket: &str) -> usize {
        self.objects
            .read()
            .keys()
            .filter(|(b, _)| b == bucket)
            .count()
    }

    /// Whether `file_name` exists in `bucket`
    pub fn contains(&self, bucket: &str, file_name: &str) -> bool {
        self.objects
            .read()
            .contains_key(&(bucket.to_string(), file_name.to_string()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload_file(
        &self,
        buffer: Bytes,
        bucket: &str,
        file_name: &str,
    ) -> ServiceResult<StoredFile> {
        let key = (bucket.to_string(), file_name.to_string());
        let mut objects = self.objects.write();
        if objects.contains_key(&key) {
            return Err(ServiceError::Storage(format!(
                "Object already exists: {}/{}",
                bucket, file_name
            )));
        }
        objects.insert(key, buffer);

        tracing::debug!(bucket, file_name, "Stored object in memory");

        Ok(StoredFile {
            url: format!("memory://{}/{}", bucket, encode_object_name(file_name)),
            storage_id: file_name.to_string(),
            bucket: bucket.to_string(),
            path: Some(format!("{}/{}", bucket, file_name)),
        })
    }

    async fn download_file(&self, bucket: &str, file_name: &str) -> ServiceResult<Bytes> {
        self.objects
            .read()
            .get(&(bucket.to_string(), file_name.to_string()))
            .cloned()
            .ok_or_else(|| {
                ServiceError::Storage(format!("Object not found: {}/{}", bucket, file_name))
            })
    }
}
