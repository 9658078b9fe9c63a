//! docgen-supabase - Supabase Storage blob store
//!
//! Stores template and generated document files in Supabase Storage buckets
//! through its REST API, authenticating with the project's service key.
//!
//! # Example
//!
//! ```ignore
//! use docgen_supabase::{SupabaseBlobStore, SupabaseConfig};
//!
//! let store = SupabaseBlobStore::new(SupabaseConfig::new(
//!     "https://abc.supabase.co",
//!     std::env::var("SUPABASE_SERVICE_KEY")?,
//! ))?;
//! ```

pub mod error;
pub mod store;

pub use error::{Result, SupabaseError};
pub use store::{SupabaseBlobStore, SupabaseConfig, DEFAULT_SIGNED_URL_TTL};
