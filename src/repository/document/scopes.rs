// ABOUTME: DocumentDB/MongoDB-CE/MongoDB-backed ScopeRepository — `_id = name`

use super::codec::{from_document, to_document_with_id};
use crate::models::Scope;
use crate::repository::ScopeRepository;
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::Collection;
use registry_core::{AppError, AppResult};

pub struct DocumentScopeRepository {
    collection: Collection<Document>,
}

impl DocumentScopeRepository {
    #[must_use]
    pub const fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl ScopeRepository for DocumentScopeRepository {
    async fn load_all(&self) -> AppResult<Vec<Scope>> {
        self.list_all().await
    }

    async fn get(&self, name: &str) -> AppResult<Option<Scope>> {
        let doc = self
            .collection
            .find_one(doc! { "_id": name })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        doc.map(from_document).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Scope>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let mut scopes: Vec<Scope> = docs.into_iter().map(from_document).collect::<AppResult<_>>()?;
        scopes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scopes)
    }

    async fn create(&self, scope: Scope) -> AppResult<Scope> {
        let document = to_document_with_id(&scope, &scope.name)?;
        self.collection.insert_one(document).await.map_err(|e| {
            if e.to_string().contains("E11000") {
                AppError::already_exists(format!("scope {}", scope.name))
            } else {
                AppError::backend_unavailable(e.to_string())
            }
        })?;
        Ok(scope)
    }

    async fn update(&self, scope: Scope) -> AppResult<Scope> {
        let document = to_document_with_id(&scope, &scope.name)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": &scope.name }, document)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        if result.matched_count == 0 {
            return Err(AppError::not_found(format!("scope {}", scope.name)));
        }
        Ok(scope)
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": name })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(result.deleted_count > 0)
    }
}
