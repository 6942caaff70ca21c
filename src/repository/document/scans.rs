// ABOUTME: DocumentDB/MongoDB-CE/MongoDB-backed SecurityScanRepository — append-only

use crate::models::SecurityScanResult;
use crate::repository::SecurityScanRepository;
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::Collection;
use registry_core::{AppError, AppResult};

pub struct DocumentSecurityScanRepository {
    collection: Collection<Document>,
}

impl DocumentSecurityScanRepository {
    #[must_use]
    pub const fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    #[must_use]
    pub const fn collection_handle(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl SecurityScanRepository for DocumentSecurityScanRepository {
    async fn append(&self, result: SecurityScanResult) -> AppResult<SecurityScanResult> {
        let document = bson::to_document(&result)
            .map_err(|e| AppError::unexpected(format!("bson encode error: {e}")))?;
        self.collection
            .insert_one(document)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(result)
    }

    async fn current(&self, entity_path: &str) -> AppResult<Option<SecurityScanResult>> {
        let options = FindOptions::builder()
            .sort(doc! { "scanned_at": -1 })
            .limit(1)
            .build();
        let mut cursor = self
            .collection
            .find(doc! { "entity_path": entity_path })
            .with_options(options)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let doc = cursor
            .try_next()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        doc.map(|d| bson::from_document(d).map_err(|e| AppError::unexpected(e.to_string())))
            .transpose()
    }

    async fn history(&self, entity_path: &str) -> AppResult<Vec<SecurityScanResult>> {
        let options = FindOptions::builder().sort(doc! { "scanned_at": 1 }).build();
        let cursor = self
            .collection
            .find(doc! { "entity_path": entity_path })
            .with_options(options)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        docs.into_iter()
            .map(|d| bson::from_document(d).map_err(|e| AppError::unexpected(e.to_string())))
            .collect()
    }
}
