// ABOUTME: DocumentDB/MongoDB-CE/MongoDB-backed AgentRepository — `_id = path`

use super::codec::{from_document, to_document_with_id};
use crate::models::{Agent, EnabledState, RatingEntry};
use crate::repository::AgentRepository;
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::Collection;
use registry_core::{AppError, AppResult};

pub struct DocumentAgentRepository {
    collection: Collection<Document>,
}

impl DocumentAgentRepository {
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
impl AgentRepository for DocumentAgentRepository {
    async fn load_all(&self) -> AppResult<Vec<Agent>> {
        self.list_all().await
    }

    async fn get(&self, path: &str) -> AppResult<Option<Agent>> {
        let doc = self
            .collection
            .find_one(doc! { "_id": path })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        doc.map(from_document).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Agent>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let mut agents: Vec<Agent> = docs.into_iter().map(from_document).collect::<AppResult<_>>()?;
        agents.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(agents)
    }

    async fn create(&self, mut agent: Agent) -> AppResult<Agent> {
        let now = chrono::Utc::now();
        agent.registered_at = now;
        agent.updated_at = now;
        let document = to_document_with_id(&agent, &agent.path)?;
        self.collection.insert_one(document).await.map_err(|e| {
            if e.to_string().contains("E11000") {
                AppError::already_exists(format!("agent {}", agent.path))
            } else {
                AppError::backend_unavailable(e.to_string())
            }
        })?;
        Ok(agent)
    }

    async fn update(&self, mut agent: Agent) -> AppResult<Agent> {
        agent.updated_at = chrono::Utc::now();
        let document = to_document_with_id(&agent, &agent.path)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": &agent.path }, document)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        if result.matched_count == 0 {
            return Err(AppError::not_found(format!("agent {}", agent.path)));
        }
        Ok(agent)
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": path })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(result.deleted_count > 0)
    }

    async fn get_state(&self) -> AppResult<EnabledState> {
        let cursor = self
            .collection
            .find(doc! {})
            .projection(doc! { "_id": 1, "is_enabled": 1 })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let mut state = EnabledState::default();
        for doc in docs {
            let Some(path) = doc.get_str("_id").ok() else { continue };
            let enabled = doc.get_bool("is_enabled").unwrap_or(false);
            state.set_enabled(path, enabled);
        }
        Ok(state)
    }

    async fn set_enabled(&self, path: &str, enabled: bool) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": path },
                doc! { "$set": { "is_enabled": enabled, "updated_at": bson::DateTime::now() } },
            )
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        if result.matched_count == 0 {
            return Err(AppError::not_found(format!("agent {path}")));
        }
        Ok(())
    }

    async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Agent> {
        let mut agent = self
            .get(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("agent {path}")))?;

        if let Some(existing) = agent.rating_details.iter_mut().find(|r| r.username == username) {
            existing.rating = rating;
        } else {
            agent.rating_details.push(RatingEntry {
                username: username.to_string(),
                rating,
            });
        }
        self.update(agent).await
    }
}
