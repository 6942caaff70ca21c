// ABOUTME: DocumentDB/MongoDB-CE/MongoDB-backed FederationConfigRepository — `_id = id`

use super::codec::{from_document, to_document_with_id};
use crate::models::FederationConfig;
use crate::repository::FederationConfigRepository;
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::Collection;
use registry_core::{AppError, AppResult};

pub struct DocumentFederationConfigRepository {
    collection: Collection<Document>,
}

impl DocumentFederationConfigRepository {
    #[must_use]
    pub const fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl FederationConfigRepository for DocumentFederationConfigRepository {
    async fn load_all(&self) -> AppResult<Vec<FederationConfig>> {
        self.list_all().await
    }

    async fn get(&self, id: &str) -> AppResult<Option<FederationConfig>> {
        let doc = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        doc.map(from_document).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<FederationConfig>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let mut configs: Vec<FederationConfig> =
            docs.into_iter().map(from_document).collect::<AppResult<_>>()?;
        configs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(configs)
    }

    async fn create(&self, config: FederationConfig) -> AppResult<FederationConfig> {
        let document = to_document_with_id(&config, &config.id)?;
        self.collection.insert_one(document).await.map_err(|e| {
            if e.to_string().contains("E11000") {
                AppError::already_exists(format!("federation config {}", config.id))
            } else {
                AppError::backend_unavailable(e.to_string())
            }
        })?;
        Ok(config)
    }

    async fn update(&self, config: FederationConfig) -> AppResult<FederationConfig> {
        let document = to_document_with_id(&config, &config.id)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": &config.id }, document)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        if result.matched_count == 0 {
            return Err(AppError::not_found(format!("federation config {}", config.id)));
        }
        Ok(config)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(result.deleted_count > 0)
    }
}
