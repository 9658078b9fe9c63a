//! docgen-ooxml - Office Open XML template processor
//!
//! Implements [`docgen_core::DocumentProcessor`] for Word (`.docx`) and
//! Excel (`.xlsx`) templates. Placeholders are `{name}` tokens in document
//! text and may be split over several formatting runs. Rendered files are
//! converted to PDF with a headless LibreOffice.
//!
//! # Example
//!
//! ```ignore
//! use docgen_ooxml::{ConverterConfig, OoxmlProcessor};
//!
//! let processor = OoxmlProcessor::new(ConverterConfig::default())?;
//! let names = processor.extract_placeholders_from_docx(&bytes).await?;
//! ```

pub mod convert;
pub mod error;
mod package;
mod placeholder;
mod processor;
mod runs;
mod xml;

pub use convert::{ConverterConfig, DEFAULT_CONVERSION_TIMEOUT, DEFAULT_SOFFICE};
pub use error::OoxmlError;
pub use processor::OoxmlProcessor;
