//! docgen-api - REST API layer for templates and generated documents
//!
//! This crate provides the HTTP API that serves template and document
//! endpoints on top of the collaborator traits from `docgen-core`. It does
//! not know which storage, blob store or document processor it runs with.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use docgen_api::{create_router, AppState};
//! use docgen_core::{MemStorage, MemoryBlobStore};
//! use docgen_ooxml::{ConverterConfig, OoxmlProcessor};
//!
//! let state = AppState::new(
//!     Arc::new(MemStorage::new()),
//!     Arc::new(MemoryBlobStore::new()),
//!     Arc::new(OoxmlProcessor::new(ConverterConfig::default())?),
//! );
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;
pub mod views;

pub use error::ApiError;
pub use state::AppState;
pub use views::API_PREFIX;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the docgen REST API router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Template routes
        .route(
            "/templates",
            get(handlers::templates::list_templates).post(handlers::templates::upload_template),
        )
        .route("/templates/{id}", get(handlers::templates::get_template))
        .route(
            "/templates/{id}/download",
            get(handlers::templates::download_template),
        )
        // Document routes
        .route("/documents", get(handlers::documents::list_documents))
        .route(
            "/documents/generate",
            post(handlers::documents::generate_document),
        )
        .route(
            "/documents/template/{template_id}",
            get(handlers::documents::list_documents_by_template),
        )
        .route("/documents/{id}", get(handlers::documents::get_document))
        .route(
            "/documents/{id}/download",
            get(handlers::documents::download_document),
        );

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes());

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        .nest(API_PREFIX, api)
        // Middleware
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
