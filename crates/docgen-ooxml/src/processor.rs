//! OoxmlProcessor - DocumentProcessor for `.docx` and `.xlsx` templates

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use docgen_core::{DocumentProcessor, FileType, PlaceholderData, ServiceError, ServiceResult};

use crate::convert::{self, ConverterConfig};
use crate::error::Result;
use crate::package::{self, Family};
use crate::placeholder::Tokens;
use crate::runs::TextLayout;

/// Compiled patterns shared by all requests
#[derive(Debug)]
struct Engine {
    tokens: Tokens,
    word: TextLayout,
    spreadsheet: TextLayout,
}

impl Engine {
    fn layout(&self, family: Family) -> &TextLayout {
        match family {
            Family::Word => &self.word,
            Family::Spreadsheet => &self.spreadsheet,
        }
    }

    fn extract(&self, family: Family, buffer: &[u8]) -> Result<Vec<String>> {
        let layout = self.layout(family);
        let mut names = Vec::new();
        for (_, xml) in package::text_parts(buffer, family)? {
            layout.collect_names(&xml, &self.tokens, &mut names);
        }
        Ok(names)
    }

    fn render(&self, family: Family, buffer: &[u8], data: &PlaceholderData) -> Result<Vec<u8>> {
        let layout = self.layout(family);
        package::rewrite(buffer, family, |_, xml| {
            layout.render(xml, &self.tokens, data).into_owned()
        })
    }
}

/// Template processor for Office Open XML files.
///
/// Placeholders are `{name}` tokens in document text. Zip and XML work runs
/// on the blocking thread pool; PDF conversion shells out to LibreOffice.
#[derive(Debug, Clone)]
pub struct OoxmlProcessor {
    engine: Arc<Engine>,
    converter: ConverterConfig,
}

impl OoxmlProcessor {
    pub fn new(converter: ConverterConfig) -> Result<Self> {
        Ok(Self {
            engine: Arc::new(Engine {
                tokens: Tokens::new()?,
                word: TextLayout::word()?,
                spreadsheet: TextLayout::spreadsheet()?,
            }),
            converter,
        })
    }

    async fn extract_family(&self, family: Family, buffer: &[u8]) -> ServiceResult<Vec<String>> {
        let engine = self.engine.clone();
        let buffer = buffer.to_vec();

        let names = tokio::task::spawn_blocking(move || engine.extract(family, &buffer))
            .await
            .map_err(|e| ServiceError::Internal(format!("Extraction task failed: {}", e)))??;

        tracing::debug!(?family, placeholders = names.len(), "Extracted placeholders");
        Ok(names)
    }

    async fn render_family(
        &self,
        family: Family,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes> {
        let engine = self.engine.clone();
        let buffer = buffer.to_vec();
        let data = data.clone();

        let rendered = tokio::task::spawn_blocking(move || engine.render(family, &buffer, &data))
            .await
            .map_err(|e| ServiceError::Internal(format!("Render task failed: {}", e)))??;

        tracing::debug!(?family, size = rendered.len(), "Rendered template");
        Ok(Bytes::from(rendered))
    }
}

#[async_trait]
impl DocumentProcessor for OoxmlProcessor {
    async fn extract_placeholders_from_docx(&self, buffer: &[u8]) -> ServiceResult<Vec<String>> {
        self.extract_family(Family::Word, buffer).await
    }

    async fn extract_placeholders_from_excel(
        &self,
        buffer: &[u8],
    ) -> ServiceResult<Vec<String>> {
        self.extract_family(Family::Spreadsheet, buffer).await
    }

    async fn process_docx_template(
        &self,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes> {
        self.render_family(Family::Word, buffer, data).await
    }

    async fn process_excel_template(
        &self,
        buffer: &[u8],
        data: &PlaceholderData,
    ) -> ServiceResult<Bytes> {
        self.render_family(Family::Spreadsheet, buffer, data).await
    }

    async fn convert_to_pdf(&self, buffer: &[u8], source_type: FileType) -> ServiceResult<Bytes> {
        Ok(convert::convert_to_pdf(&self.converter, buffer, source_type).await?)
    }
}
