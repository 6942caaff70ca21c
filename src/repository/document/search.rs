// ABOUTME: DocumentDB/MongoDB-CE/MongoDB-backed SearchRepository — storage plus native $vectorSearch
// ABOUTME: Query-time hybrid ranking lives in the `search` module; this only talks to the collection

use crate::models::{EntityType, SearchDocument};
use crate::repository::SearchRepository;
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::Collection;
use registry_core::{AppError, AppResult};

pub struct DocumentSearchRepository {
    collection: Collection<Document>,
    vector_index_name: String,
    /// Only the `mongodb` backend (CE 8.2+/mongot) is assumed to carry a
    /// native vector-search index; `documentdb`/`mongodb-ce` always take the
    /// client-side path.
    native_vector_search: bool,
}

impl DocumentSearchRepository {
    #[must_use]
    pub const fn new(collection: Collection<Document>, vector_index_name: String, native_vector_search: bool) -> Self {
        Self {
            collection,
            vector_index_name,
            native_vector_search,
        }
    }

    #[must_use]
    pub const fn collection_handle(&self) -> &Collection<Document> {
        &self.collection
    }

    fn entity_type_filter(entity_type: Option<EntityType>) -> Document {
        entity_type.map_or_else(
            || doc! {},
            |t| doc! { "entity_type": bson::to_bson(&t).unwrap_or(bson::Bson::Null) },
        )
    }

    /// Run the native `$vectorSearch` stage and return
    /// documents paired with their raw (unnormalized) vector score.
    ///
    /// # Errors
    /// Returns `Err` with the driver's error preserved in the message on any
    /// aggregation failure, whether the cluster simply lacks a `mongot`
    /// companion process or the call failed for an unrelated infrastructure
    /// reason; callers classify the message via
    /// [`crate::repository::shared::is_unsupported_vector_search_error`] to
    /// decide whether to fall back.
    async fn run_native_vector_search(
        &self,
        query_vector: &[f32],
        num_candidates: u32,
        limit: usize,
        entity_type: Option<EntityType>,
    ) -> AppResult<Vec<(SearchDocument, f64)>> {
        let mut pipeline = vec![doc! {
            "$vectorSearch": {
                "index": &self.vector_index_name,
                "path": "embedding",
                "queryVector": query_vector.iter().map(|v| bson::Bson::Double(f64::from(*v))).collect::<Vec<_>>(),
                "numCandidates": num_candidates,
                "limit": i64::try_from(limit).unwrap_or(i64::MAX),
            }
        }];
        if let Some(entity_type) = entity_type {
            pipeline.push(doc! { "$match": { "entity_type": bson::to_bson(&entity_type).unwrap_or(bson::Bson::Null) } });
        }
        pipeline.push(doc! { "$addFields": { "_vector_score": { "$meta": "vectorSearchScore" } } });

        let cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;

        docs.into_iter()
            .map(|mut d| {
                let score = d.remove("_vector_score").and_then(|b| b.as_f64()).unwrap_or(0.0);
                let document: SearchDocument =
                    bson::from_document(d).map_err(|e| AppError::unexpected(e.to_string()))?;
                Ok((document, score))
            })
            .collect()
    }

}

#[async_trait]
impl SearchRepository for DocumentSearchRepository {
    async fn index_entity(&self, document: SearchDocument) -> AppResult<()> {
        let mut bson_doc = bson::to_document(&document)
            .map_err(|e| AppError::unexpected(format!("bson encode error: {e}")))?;
        bson_doc.insert("_id", document.path.clone());
        self.collection
            .replace_one(doc! { "_id": &document.path }, bson_doc)
            .upsert(true)
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn remove_entity(&self, path: &str) -> AppResult<()> {
        self.collection
            .delete_one(doc! { "_id": path })
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn all_documents(&self, entity_type: Option<EntityType>) -> AppResult<Vec<SearchDocument>> {
        let cursor = self
            .collection
            .find(Self::entity_type_filter(entity_type))
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

    fn supports_native_vector_search(&self) -> bool {
        self.native_vector_search
    }

    async fn native_vector_search(
        &self,
        query_vector: &[f32],
        num_candidates: u32,
        limit: usize,
        entity_type: Option<EntityType>,
    ) -> AppResult<Vec<(SearchDocument, f64)>> {
        self.run_native_vector_search(query_vector, num_candidates, limit, entity_type)
            .await
    }
}
