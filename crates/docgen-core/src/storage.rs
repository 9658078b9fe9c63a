//! Storage trait - metadata persistence for templates and documents

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::ServiceResult;
use crate::models::{Document, NewDocument, NewTemplate, Template};

/// Metadata persistence for templates and generated documents.
///
/// Records are append-only: there are no update or delete operations.
/// Lookups return `Ok(None)` for unknown ids; errors are reserved for
/// failures of the store itself.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_all_templates(&self) -> ServiceResult<Vec<Template>>;

    async fn get_template(&self, id: i64) -> ServiceResult<Option<Template>>;

    /// Persist a template, assigning `id` and `created_at`
    async fn create_template(&self, template: NewTemplate) -> ServiceResult<Template>;

    async fn get_all_documents(&self) -> ServiceResult<Vec<Document>>;

    async fn get_document(&self, id: i64) -> ServiceResult<Option<Document>>;

    /// Persist a document, assigning `id` and `created_at`
    async fn create_document(&self, document: NewDocument) -> ServiceResult<Document>;

    /// All documents whose `template_id` matches, in creation order
    async fn get_documents_by_template(&self, template_id: i64) -> ServiceResult<Vec<Document>>;
}

#[derive(Default)]
struct Records {
    templates: BTreeMap<i64, Template>,
    documents: BTreeMap<i64, Document>,
    last_template_id: i64,
    last_document_id: i64,
}

/// In-process storage with sequential ids starting at 1
#[derive(Default)]
pub struct MemStorage {
    records: RwLock<Records>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_all_templates(&self) -> ServiceResult<Vec<Template>> {
        Ok(self.records.read().templates.values().cloned().collect())
    }

    async fn get_template(&self, id: i64) -> ServiceResult<Option<Template>> {
        Ok(self.records.read().templates.get(&id).cloned())
    }

    async fn create_template(&self, template: NewTemplate) -> ServiceResult<Template> {
        let mut records = self.records.write();
        records.last_template_id += 1;
        let id = records.last_template_id;
        let template = template.into_template(id, Utc::now());
        records.templates.insert(id, template.clone());
        Ok(template)
    }

    async fn get_all_documents(&self) -> ServiceResult<Vec<Document>> {
        Ok(self.records.read().documents.values().cloned().collect())
    }

    async fn get_document(&self, id: i64) -> ServiceResult<Option<Document>> {
        Ok(self.records.read().documents.get(&id).cloned())
    }

    async fn create_document(&self, document: NewDocument) -> ServiceResult<Document> {
        let mut records = self.records.write();
        records.last_document_id += 1;
        let id = records.last_document_id;
        let document = document.into_document(id, Utc::now());
        records.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn get_documents_by_template(&self, template_id: i64) -> ServiceResult<Vec<Document>> {
        Ok(self
            .records
            .read()
            .documents
            .values()
            .filter(|d| d.template_id == template_id)
            .cloned()
            .collect())
    }
}
