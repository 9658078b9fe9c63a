//! Application state for the docgen API

use std::sync::Arc;

use docgen_core::{BlobStore, DocumentProcessor, Storage};

/// Default request body limit for uploads (25 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across all handlers.
///
/// Holds only the collaborators; no request data survives between calls.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn Storage>,
    blobs: Arc<dyn BlobStore>,
    processor: Arc<dyn DocumentProcessor>,
    max_upload_bytes: usize,
}

impl AppState {
    /// Create a new AppState with the given collaborators
    pub fn new(
        storage: Arc<dyn Storage>,
        blobs: Arc<dyn BlobStore>,
        processor: Arc<dyn DocumentProcessor>,
    ) -> Self {
        Self {
            storage,
            blobs,
            processor,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the request body limit
    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Metadata store
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Blob store
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// Document processor
    pub fn processor(&self) -> &dyn DocumentProcessor {
        self.processor.as_ref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}
