//! docgend - docgen server daemon
//!
//! REST API for uploading Word/Excel templates and generating documents
//! from them.
//!
//! Usage:
//!   docgend [config.toml]
//!
//! If no config file is provided, defaults are used. Supabase Storage is
//! used when `SUPABASE_URL` and `SUPABASE_SERVICE_KEY` are set, in-memory
//! blob storage otherwise.

mod config;

use std::sync::Arc;

use docgen_api::{create_router, AppState};
use docgen_core::{BlobStore, MemStorage, MemoryBlobStore};
use docgen_ooxml::OoxmlProcessor;
use docgen_supabase::SupabaseBlobStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{BlobStoreKind, DaemonConfig};

/// Parsed command-line arguments
struct Args {
    /// Server config file (TOML)
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args { config_path: None };

    for arg in &args {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"docgend - docgen server daemon

Usage: docgend [OPTIONS] [config.toml]

Options:
  -h, --help    Print this help message

Environment:
  SUPABASE_URL            Supabase project URL
  SUPABASE_SERVICE_KEY    Supabase service role key
  DOCGEN_PORT             Listen port (overrides [server] port)
  RUST_LOG                Log filter (default: info for docgen crates)

Examples:
  # Development server with in-memory storage
  docgend

  # Run with config file
  docgend docgend.toml
"#
    );
}

fn create_blob_store(config: &DaemonConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.blob_store_kind() {
        BlobStoreKind::Supabase => {
            let supabase = config.supabase()?;
            tracing::info!(url = %supabase.url, public = supabase.public, "Using Supabase Storage");
            Ok(Arc::new(SupabaseBlobStore::new(supabase)?))
        }
        BlobStoreKind::Memory => {
            tracing::warn!("Using in-memory blob storage, files are lost on restart");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "docgend=info,docgen_api=info,docgen_ooxml=info,docgen_supabase=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting docgend");

    // Parse command-line arguments
    let args = parse_args();

    let mut config = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        DaemonConfig::load(path)?
    } else {
        tracing::info!("No config file provided, using defaults");
        DaemonConfig::default()
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    let blobs = create_blob_store(&config)?;

    let converter = config.converter();
    tracing::info!(soffice = %converter.soffice_path.display(), "PDF conversion via LibreOffice");
    let processor = OoxmlProcessor::new(converter)?;

    // Metadata lives in process memory
    let state = AppState::new(Arc::new(MemStorage::new()), blobs, Arc::new(processor))
        .with_upload_limit(config.server.max_upload_bytes);

    // Create the router
    let app = create_router(state);

    // Bind to address
    let listener = config.bind().await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    // Run the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
