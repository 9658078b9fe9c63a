//! Shared data models for templates and generated documents

mod document;
mod file_type;
mod template;

pub use document::*;
pub use file_type::*;
pub use template::*;
