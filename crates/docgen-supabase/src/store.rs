//! Supabase Storage REST client implementing [`BlobStore`]

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use docgen_core::blob::encode_object_name;
use docgen_core::{
    BlobStore, ServiceResult, StoredFile, DOCX_CONTENT_TYPE, EXCEL_CONTENT_TYPE, PDF_CONTENT_TYPE,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SupabaseError};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default lifetime of signed URLs handed out for private buckets
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service role key, sent as `apikey` and bearer token
    pub service_key: String,
    /// Buckets are public: stored files get their public URL.
    /// Otherwise a signed URL valid for `signed_url_ttl` is returned.
    pub public: bool,
    pub signed_url_ttl: Duration,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            public: true,
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Upload response body
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

/// Signed URL response body; the URL is relative to `/storage/v1`
#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

/// Error body returned by the Storage API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Content type sent with an upload, from the object name's extension
fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("docx") => DOCX_CONTENT_TYPE,
        Some("xlsx") | Some("xls") => EXCEL_CONTENT_TYPE,
        Some("pdf") => PDF_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

/// Blob store backed by Supabase Storage
#[derive(Debug, Clone)]
pub struct SupabaseBlobStore {
    client: Client,
    /// `{project url}/storage/v1/`
    storage_url: Url,
    public: bool,
    signed_url_ttl: Duration,
}

impl SupabaseBlobStore {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let apikey = HeaderValue::from_str(&config.service_key)
            .map_err(|e| SupabaseError::InvalidKey(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|e| SupabaseError::InvalidKey(e.to_string()))?;
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let base = format!("{}/storage/v1/", config.url.trim_end_matches('/'));
        let storage_url = Url::parse(&base)?;

        Ok(Self {
            client,
            storage_url,
            public: config.public,
            signed_url_ttl: config.signed_url_ttl,
        })
    }

    /// `object/{bucket}/{name}` style URL below the storage API root
    fn object_url(&self, scope: &str, bucket: &str, file_name: &str) -> Result<Url> {
        Ok(self.storage_url.join(&format!(
            "{}/{}/{}",
            scope,
            encode_object_name(bucket),
            encode_object_name(file_name)
        ))?)
    }

    /// Public URL of an object in a public bucket
    pub fn public_url(&self, bucket: &str, file_name: &str) -> Result<Url> {
        self.object_url("object/public", bucket, file_name)
    }

    /// Signed URL of an object, valid for the configured lifetime
    #[instrument(skip(self))]
    pub async fn signed_url(&self, bucket: &str, file_name: &str) -> Result<Url> {
        let url = self.object_url("object/sign", bucket, file_name)?;
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "expiresIn": self.signed_url_ttl.as_secs() }))
            .send()
            .await?;

        let signed: SignResponse = self.handle_response(response).await?;
        let relative = signed.signed_url.trim_start_matches('/');
        Ok(self.storage_url.join(relative)?)
    }

    #[instrument(skip(self, buffer), fields(size = buffer.len()))]
    async fn upload(&self, buffer: Bytes, bucket: &str, file_name: &str) -> Result<StoredFile> {
        let url = self.object_url("object", bucket, file_name)?;
        debug!("Uploading object to {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type_for(file_name))
            .header("x-upsert", "false")
            .body(buffer)
            .send()
            .await?;

        let uploaded: UploadResponse = self.handle_response(response).await?;

        let url = if self.public {
            self.public_url(bucket, file_name)?
        } else {
            self.signed_url(bucket, file_name).await?
        };

        Ok(StoredFile {
            url: url.to_string(),
            storage_id: file_name.to_string(),
            bucket: bucket.to_string(),
            path: uploaded.key,
        })
    }

    #[instrument(skip(self))]
    async fn download(&self, bucket: &str, file_name: &str) -> Result<Bytes> {
        let url = self.object_url("object", bucket, file_name)?;
        debug!("Downloading object from {}", url);

        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.bytes().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Handle a JSON response, converting error statuses
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| SupabaseError::Parse(e.to_string()))
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error from failed response
    async fn extract_error(&self, response: reqwest::Response) -> SupabaseError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                message: Some(message),
                ..
            }) => message,
            Ok(ErrorResponse {
                error: Some(error), ..
            }) => error,
            _ => format!("HTTP {}", status),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!(status = status.as_u16(), "Storage API rejected credentials");
                SupabaseError::api(status.as_u16(), message)
            }
            _ => SupabaseError::api(status.as_u16(), message),
        }
    }
}

#[async_trait]
impl BlobStore for SupabaseBlobStore {
    async fn upload_file(
        &self,
        buffer: Bytes,
        bucket: &str,
        file_name: &str,
    ) -> ServiceResult<StoredFile> {
        Ok(self.upload(buffer, bucket, file_name).await?)
    }

    async fn download_file(&self, bucket: &str, file_name: &str) -> ServiceResult<Bytes> {
        Ok(self.download(bucket, file_name).await?)
    }
}
