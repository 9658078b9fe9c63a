//! TOML configuration for the daemon
//!
//! Every setting has a default, so an empty file (or no file) starts a
//! development server with in-memory blob storage. Supabase credentials are
//! usually supplied through the environment instead of the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use docgen_api::state::DEFAULT_MAX_UPLOAD_BYTES;
use docgen_ooxml::{ConverterConfig, DEFAULT_CONVERSION_TIMEOUT, DEFAULT_SOFFICE};
use docgen_supabase::{SupabaseConfig, DEFAULT_SIGNED_URL_TTL};
use serde::Deserialize;
use tokio::net::TcpListener;

pub const DEFAULT_PORT: u16 = 18090;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_SERVICE_KEY: &str = "SUPABASE_SERVICE_KEY";
pub const ENV_PORT: &str = "DOCGEN_PORT";

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit, bounds template uploads
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Which blob store backs the buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobStoreKind {
    Memory,
    Supabase,
}

/// `[blob_store]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlobStoreConfig {
    /// Unset: Supabase when URL and key are known, memory otherwise
    pub kind: Option<BlobStoreKind>,
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub public: bool,
    pub signed_url_ttl_secs: u64,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            kind: None,
            url: None,
            service_key: None,
            public: true,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL.as_secs(),
        }
    }
}

/// `[converter]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterSection {
    pub soffice_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for ConverterSection {
    fn default() -> Self {
        Self {
            soffice_path: PathBuf::from(DEFAULT_SOFFICE),
            timeout_secs: DEFAULT_CONVERSION_TIMEOUT.as_secs(),
        }
    }
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub server: ServerConfig,
    pub blob_store: BlobStoreConfig,
    pub converter: ConverterSection,
}

impl DaemonConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SUPABASE_URL).filter(|v| !v.is_empty()) {
            self.blob_store.url = Some(url);
        }
        if let Some(key) = lookup(ENV_SUPABASE_SERVICE_KEY).filter(|v| !v.is_empty()) {
            self.blob_store.service_key = Some(key);
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{} is not a valid port: '{}'", ENV_PORT, port))?;
        }
        Ok(())
    }

    /// Blob store to run with
    pub fn blob_store_kind(&self) -> BlobStoreKind {
        match self.blob_store.kind {
            Some(kind) => kind,
            None if self.blob_store.url.is_some() && self.blob_store.service_key.is_some() => {
                BlobStoreKind::Supabase
            }
            None => BlobStoreKind::Memory,
        }
    }

    /// Supabase connection settings; URL and service key are required
    pub fn supabase(&self) -> anyhow::Result<SupabaseConfig> {
        let url = self.blob_store.url.clone().with_context(|| {
            format!("Supabase blob store needs blob_store.url or {}", ENV_SUPABASE_URL)
        })?;
        let key = self.blob_store.service_key.clone().with_context(|| {
            format!(
                "Supabase blob store needs blob_store.service_key or {}",
                ENV_SUPABASE_SERVICE_KEY
            )
        })?;

        let mut config = SupabaseConfig::new(url, key);
        config.public = self.blob_store.public;
        config.signed_url_ttl = Duration::from_secs(self.blob_store.signed_url_ttl_secs);
        Ok(config)
    }

    pub fn converter(&self) -> ConverterConfig {
        ConverterConfig {
            soffice_path: self.converter.soffice_path.clone(),
            timeout: Duration::from_secs(self.converter.timeout_secs),
        }
    }

    /// Host and port to listen on; the host may be a name or an IP address
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.server.host.as_str(), self.server.port)
    }

    /// Bind the listening socket, resolving the host name
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        let (host, port) = self.listen_addr();
        TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to listen on {}:{}", host, port))
    }
}
