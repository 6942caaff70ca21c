// ABOUTME: Hybrid query execution — native $vectorSearch with client-side fallback, lexical re-ranking
// ABOUTME: Backend-agnostic: only talks to SearchRepository/EmbeddingClient trait objects

use crate::models::{
    EntityType, SearchDocument, SearchQuery, SearchResultItem, SearchResults, ToolSearchResultItem,
};
use crate::repository::shared::{
    cosine_similarity, is_unsupported_vector_search_error, normalize_cosine, relevance_score, text_boost, tokenize,
};
use crate::repository::SearchRepository;
use crate::search::embeddings::EmbeddingClient;
use crate::search::ingestion::{AgentMetadata, ServerMetadata};
use registry_core::constants::search::{CANDIDATE_FANOUT, DEFAULT_NUM_CANDIDATES_MULTIPLIER, DEFAULT_RESULTS_PER_TYPE};
use registry_core::AppResult;
use std::sync::Arc;

/// Executes `/api/search/semantic` queries against whichever backend is wired
/// up. The native/fallback choice is entirely the repository's
/// business; this engine only orchestrates tokenizing, embedding, and ranking.
pub struct SearchEngine {
    repository: Arc<dyn SearchRepository>,
    embeddings: Arc<dyn EmbeddingClient>,
}

impl SearchEngine {
    #[must_use]
    pub fn new(repository: Arc<dyn SearchRepository>, embeddings: Arc<dyn EmbeddingClient>) -> Self {
        Self { repository, embeddings }
    }

    /// Run one hybrid query end to end.
    ///
    /// # Errors
    /// Returns `Err` if embedding the query text itself fails, if the
    /// fallback path's `all_documents` call fails, or if native search fails
    /// for a reason other than the backend lacking vector-search support —
    /// only the recognized "not supported" failure triggers the client-side
    /// fallback; any other native-search error propagates as-is.
    pub async fn query(&self, query: &SearchQuery) -> AppResult<SearchResults> {
        let tokens = tokenize(&query.query);
        let query_vector = self.embeddings.embed(&query.query).await?;

        let per_type_cap = query.max_results.unwrap_or(DEFAULT_RESULTS_PER_TYPE);
        let fanout_limit = per_type_cap.saturating_mul(CANDIDATE_FANOUT);
        let num_candidates = u32::try_from(fanout_limit)
            .unwrap_or(u32::MAX)
            .saturating_mul(DEFAULT_NUM_CANDIDATES_MULTIPLIER);
        let requested_types = query.entity_types.as_deref();
        let backend_filter = backend_entity_filter(requested_types);

        let scored = if self.repository.supports_native_vector_search() {
            match self
                .repository
                .native_vector_search(&query_vector, num_candidates, fanout_limit, backend_filter)
                .await
            {
                Ok(hits) => hits
                    .into_iter()
                    .map(|(doc, raw_score)| (doc, normalize_cosine(raw_score)))
                    .collect(),
                Err(e) if is_unsupported_vector_search_error(&e.message) => {
                    tracing::warn!(error = %e, "native vector search unsupported, falling back to client-side ranking");
                    self.client_side_rank(&query_vector, backend_filter).await?
                }
                Err(e) => {
                    tracing::error!(error = %e, "native vector search failed");
                    return Err(e);
                }
            }
        } else {
            self.client_side_rank(&query_vector, backend_filter).await?
        };

        Ok(assemble_results(scored, &tokens, requested_types, per_type_cap))
    }

    async fn client_side_rank(
        &self,
        query_vector: &[f32],
        entity_type: Option<EntityType>,
    ) -> AppResult<Vec<(SearchDocument, f64)>> {
        let documents = self.repository.all_documents(entity_type).await?;
        Ok(documents
            .into_iter()
            .map(|doc| {
                let similarity = cosine_similarity(query_vector, &doc.embedding);
                (doc, normalize_cosine(similarity))
            })
            .collect())
    }
}

/// A single requested entity type can be pushed down to the backend; mixed
/// or absent filters are resolved client-side after fetching both kinds.
fn backend_entity_filter(requested_types: Option<&[EntityType]>) -> Option<EntityType> {
    match requested_types {
        Some([single]) if *single != EntityType::McpTool => Some(*single),
        _ => None,
    }
}

fn requested_includes(requested_types: Option<&[EntityType]>, want: EntityType) -> bool {
    requested_types.is_none_or(|types| types.contains(&want))
}

fn assemble_results(
    scored: Vec<(SearchDocument, f64)>,
    tokens: &[String],
    requested_types: Option<&[EntityType]>,
    per_type_cap: usize,
) -> SearchResults {
    let want_servers = requested_includes(requested_types, EntityType::McpServer);
    let want_agents = requested_includes(requested_types, EntityType::A2aAgent);
    let want_tools = requested_types
        .is_none_or(|types| types.contains(&EntityType::McpServer) || types.contains(&EntityType::McpTool));

    let mut server_rows: Vec<(SearchResultItem, f64)> = Vec::new();
    let mut agent_rows: Vec<(SearchResultItem, f64)> = Vec::new();
    let mut tool_rows: Vec<(ToolSearchResultItem, f64)> = Vec::new();

    for (doc, vector_score_normalized) in scored {
        match doc.entity_type {
            EntityType::McpServer if want_servers || want_tools => {
                let Ok(metadata) = serde_json::from_value::<ServerMetadata>(doc.metadata.clone()) else {
                    continue;
                };
                let matching_tools: Vec<_> = metadata
                    .tool_list
                    .iter()
                    .filter(|tool| tool_text_matches(tokens, &tool.name, &tool.description))
                    .collect();
                let boost = text_boost(
                    tokens,
                    &doc.path,
                    &metadata.server_name,
                    &metadata.description,
                    &metadata.tags,
                    matching_tools.len(),
                );
                let score = relevance_score(vector_score_normalized, boost);

                if want_servers {
                    server_rows.push((
                        SearchResultItem {
                            path: doc.path.clone(),
                            relevance_score: score,
                            metadata: doc.metadata.clone(),
                        },
                        score,
                        doc.path.clone(),
                    ));
                }
                if want_tools {
                    for tool in matching_tools {
                        let tie_key = format!("{}\u{0}{}", doc.path, tool.name);
                        tool_rows.push((
                            ToolSearchResultItem {
                                server_path: doc.path.clone(),
                                tool_name: tool.name.clone(),
                                relevance_score: score,
                                metadata: serde_json::to_value(tool).unwrap_or(serde_json::Value::Null),
                            },
                            score,
                            tie_key,
                        ));
                    }
                }
            }
            EntityType::A2aAgent if want_agents => {
                let Ok(metadata) = serde_json::from_value::<AgentMetadata>(doc.metadata.clone()) else {
                    continue;
                };
                let boost = text_boost(tokens, &doc.path, &metadata.name, &metadata.description, &metadata.tags, 0);
                let score = relevance_score(vector_score_normalized, boost);
                agent_rows.push((
                    SearchResultItem {
                        path: doc.path.clone(),
                        relevance_score: score,
                        metadata: doc.metadata.clone(),
                    },
                    score,
                    doc.path.clone(),
                ));
            }
            _ => {}
        }
    }

    SearchResults {
        servers: cap_and_sort(server_rows, per_type_cap),
        agents: cap_and_sort(agent_rows, per_type_cap),
        tools: cap_and_sort(tool_rows, per_type_cap),
    }
}

fn tool_text_matches(tokens: &[String], name: &str, description: &str) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let name = name.to_lowercase();
    let description = description.to_lowercase();
    tokens.iter().any(|t| name.contains(t.as_str()) || description.contains(t.as_str()))
}

/// Sort descending by score, tie-broken ascending by path (Decision D3), and
/// cap to the per-entity-type limit.
fn cap_and_sort<T>(mut rows: Vec<(T, f64, String)>, cap: usize) -> Vec<T> {
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
    rows.into_iter().take(cap).map(|(item, _, _)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_entity_filter_passes_single_type_through() {
        assert_eq!(
            backend_entity_filter(Some(&[EntityType::McpServer])),
            Some(EntityType::McpServer)
        );
    }

    #[test]
    fn backend_entity_filter_resolves_mixed_or_absent_client_side() {
        assert_eq!(backend_entity_filter(None), None);
        assert_eq!(
            backend_entity_filter(Some(&[EntityType::McpServer, EntityType::A2aAgent])),
            None
        );
        assert_eq!(backend_entity_filter(Some(&[EntityType::McpTool])), None);
    }

    #[test]
    fn cap_and_sort_orders_descending_and_truncates() {
        let rows = vec![
            ("a", 0.2, "a".to_string()),
            ("b", 0.9, "b".to_string()),
            ("c", 0.5, "c".to_string()),
        ];
        assert_eq!(cap_and_sort(rows, 2), vec!["b", "c"]);
    }

    #[test]
    fn cap_and_sort_breaks_ties_by_path_ascending() {
        let rows = vec![
            ("z-path", 0.5, "z".to_string()),
            ("a-path", 0.5, "a".to_string()),
        ];
        assert_eq!(cap_and_sort(rows, 2), vec!["a-path", "z-path"]);
    }
}
