// ABOUTME: Local file-backed search index for the `file` storage backend
// ABOUTME: A single JSON document holding every indexed entity; queries always take the client-side path

use crate::models::{EntityType, SearchDocument};
use crate::repository::SearchRepository;
use async_trait::async_trait;
use registry_core::AppResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The file backend has no companion vector-search service, so its index is
/// a local structure: all documents held in memory and persisted to one
/// file, queried entirely client-side.
pub struct LocalFileSearchRepository {
    path: PathBuf,
    documents: Arc<RwLock<Vec<SearchDocument>>>,
}

impl LocalFileSearchRepository {
    pub async fn new(path: PathBuf) -> AppResult<Self> {
        let documents = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            documents: Arc::new(RwLock::new(documents)),
        })
    }

    async fn persist(&self, documents: &[SearchDocument]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(documents)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchRepository for LocalFileSearchRepository {
    async fn index_entity(&self, document: SearchDocument) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        documents.retain(|d| d.path != document.path);
        documents.push(document);
        self.persist(&documents).await
    }

    async fn remove_entity(&self, path: &str) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        documents.retain(|d| d.path != path);
        self.persist(&documents).await
    }

    async fn all_documents(&self, entity_type: Option<EntityType>) -> AppResult<Vec<SearchDocument>> {
        let documents = self.documents.read().await;
        Ok(match entity_type {
            Some(t) => documents.iter().filter(|d| d.entity_type == t).cloned().collect(),
            None => documents.clone(),
        })
    }

    fn supports_native_vector_search(&self) -> bool {
        false
    }
}
