//! Shared helpers for the docgen API integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use docgen_api::state::DEFAULT_MAX_UPLOAD_BYTES;
use docgen_api::{create_router, AppState};
use docgen_core::{
    FileType, MemStorage, MemoryBlobStore, PlaceholderData, ServiceError, ServiceResult,
};
use tokio::net::TcpListener;

// =============================================================================
// Mock Processor
// =============================================================================

/// Text-based processor: templates are UTF-8 text with `{name}` tokens
#[derive(Default)]
pub struct MockProcessor {
    pub renders: AtomicUsize,
    pub conversions: AtomicUsize,
    pub fail_extraction: bool,
}

pub const PDF_MARKER: &[u8] = b"%PDF-mock\n";

fn tokens(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else { break };
        let name = after[..end].trim().to_string();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &after[end + 1..];
    }
    names
}

fn fill(text: &str, data: &PlaceholderData) -> String {
    let mut out = text.to_string();
    for name in tokens(text) {
        let value = data.get(&name).cloned().unwrap_or_default();
        out = out.replace(&format!("{{{}}}", name), &value);
    }
    out
}

impl MockProcessor {
    fn extract(&self, buffer: &[u8]) -> ServiceResult<Vec<String>> {
        if self.fail_extraction {
            return Err(ServiceError::Processing("corrupt zip container".to_string()));
        }
        let text = std::str::from_utf8(buffer)
            .map_err(|e| ServiceError::Processing(e.to_string()))?;
        Ok(tokens(text))
    }

    fn render(&self, buffer: &[u8], data: &PlaceholderData) -> ServiceResult<Bytes> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let text = std::str::from_utf8(buffer)
            .map_err(|e| ServiceError::Processing(e.to_string()))?;
        Ok(Bytes::from(fill(text, data)))
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl docgen_core::DocumentProcessor for MockProcessor {
    async fn extract_placeholders_from_docx(&self, buffer: &[u8]) -> ServiceResult<Vec<String>> {
        self.extract(buffer)
    }

    async fn extract_placeholders_from_excel(
        &self,
        buffer: &[u8],
    ) -> ServiceResult<Vec<String>> {
        self.extract(buffer)
    }

    async fn process_docx_template(
        &self,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes> {
        self.render(buffer, data)
    }

    async fn process_excel_template(
        &self,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes> {
        self.render(buffer, data)
    }

    async fn convert_to_pdf(&self, buffer: &[u8], _source_type: FileType) -> ServiceResult<Bytes> {
        self.conversions.fetch_add(1, Ordering::SeqCst);
        let mut out = PDF_MARKER.to_vec();
        out.extend_from_slice(buffer);
        Ok(Bytes::from(out))
    }
}

// =============================================================================
// Test Server
// =============================================================================

/// A test server that shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start(router: axum::Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        tokio::time::sleep(Duration::from_millis(10)).await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build client");

        Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Fixture
// =============================================================================

/// Running server plus handles on its in-memory collaborators
pub struct Fixture {
    pub server: TestServer,
    pub storage: Arc<MemStorage>,
    pub blobs: Arc<MemoryBlobStore>,
    pub processor: Arc<MockProcessor>,
}

impl Fixture {
    pub async fn start() -> Self {
        Self::with_processor(MockProcessor::default()).await
    }

    pub async fn with_processor(processor: MockProcessor) -> Self {
        Self::build(processor, DEFAULT_MAX_UPLOAD_BYTES).await
    }

    pub async fn with_upload_limit(max_upload_bytes: usize) -> Self {
        Self::build(MockProcessor::default(), max_upload_bytes).await
    }

    async fn build(processor: MockProcessor, max_upload_bytes: usize) -> Self {
        let storage = Arc::new(MemStorage::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let processor = Arc::new(processor);

        let state = AppState::new(storage.clone(), blobs.clone(), processor.clone())
            .with_upload_limit(max_upload_bytes);
        let server = TestServer::start(create_router(state)).await;

        Self {
            server,
            storage,
            blobs,
            processor,
        }
    }

    pub fn url(&self, path: &str) -> String {
        self.server.url(path)
    }

    /// POST a file as multipart field `file`
    pub async fn upload(&self, file_name: &str, content: &[u8]) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(content.to_vec()).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.server
            .client
            .post(self.url("/api/templates"))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }

    /// Upload a template and return its id
    pub async fn upload_template(&self, file_name: &str, content: &str) -> i64 {
        let response = self.upload(file_name, content.as_bytes()).await;
        assert_eq!(response.status(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        body["template"]["id"].as_i64().unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.server
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn generate(&self, body: serde_json::Value) -> reqwest::Response {
        self.server
            .client
            .post(self.url("/api/documents/generate"))
            .json(&body)
            .send()
            .await
            .expect("generate request failed")
    }
}
