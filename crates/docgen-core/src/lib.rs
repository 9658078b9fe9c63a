//! docgen-core - Core models and collaborator traits for the docgen service
//!
//! The HTTP layer in `docgen-api` only talks to the three seams defined here:
//! [`Storage`] for template/document metadata, [`BlobStore`] for the raw
//! files and [`DocumentProcessor`] for placeholder extraction, rendering and
//! PDF conversion. In-process implementations of the first two are provided
//! for development servers and tests.

pub mod blob;
pub mod error;
pub mod models;
pub mod processor;
pub mod storage;

pub use blob::{BlobStore, MemoryBlobStore, StoredFile, DOCUMENTS_BUCKET, TEMPLATES_BUCKET};
pub use error::{ServiceError, ServiceResult};
pub use models::*;
pub use processor::DocumentProcessor;
pub use storage::{MemStorage, Storage};
