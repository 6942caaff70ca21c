// ABOUTME: Builds SearchDocuments from registered entities and drives index_entity/remove_entity
// ABOUTME: Embedding failures and index-write failures are logged, never propagated — the primary write always wins

use crate::models::{Agent, EntityType, SearchDocument, Server, Skill, ToolDescriptor};
use crate::repository::SearchRepository;
use crate::search::embeddings::EmbeddingClient;
use serde::{Deserialize, Serialize};

/// Metadata snapshot stored alongside a server's embedding, rendered directly
/// into search results without a second repository lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMetadata {
    pub server_name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub tool_list: Vec<ToolDescriptor>,
    pub is_enabled: bool,
    pub num_stars: f64,
}

/// Metadata snapshot stored alongside an agent's embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub skills: Vec<Skill>,
    pub is_enabled: bool,
    pub num_stars: f64,
}

fn server_document(server: &Server, embedding: Vec<f32>) -> SearchDocument {
    let metadata = ServerMetadata {
        server_name: server.server_name.clone(),
        description: server.description.clone(),
        tags: server.tags.iter().cloned().collect(),
        tool_list: server.tool_list.clone(),
        is_enabled: server.is_enabled,
        num_stars: server.num_stars(),
    };
    SearchDocument {
        entity_type: EntityType::McpServer,
        path: server.path.clone(),
        text: server.text_for_embedding(),
        embedding,
        metadata: serde_json::to_value(metadata).unwrap_or(serde_json::Value::Null),
    }
}

fn agent_document(agent: &Agent, embedding: Vec<f32>) -> SearchDocument {
    let metadata = AgentMetadata {
        name: agent.name.clone(),
        description: agent.description.clone(),
        tags: agent.tags.iter().cloned().collect(),
        skills: agent.skills.clone(),
        is_enabled: agent.is_enabled,
        num_stars: agent.num_stars(),
    };
    SearchDocument {
        entity_type: EntityType::A2aAgent,
        path: agent.path.clone(),
        text: agent.text_for_embedding(),
        embedding,
        metadata: serde_json::to_value(metadata).unwrap_or(serde_json::Value::Null),
    }
}

/// Embed and index a server. Never fails the caller: embedding or index
/// errors are logged and swallowed.
pub async fn index_server(
    search: &dyn SearchRepository,
    embeddings: &dyn EmbeddingClient,
    server: &Server,
) {
    let text = server.text_for_embedding();
    let embedding = match embeddings.embed(&text).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %server.path, error = %e, "failed to embed server for search index");
            return;
        }
    };
    if let Err(e) = search.index_entity(server_document(server, embedding)).await {
        tracing::warn!(path = %server.path, error = %e, "failed to index server");
    }
}

/// Embed and index an agent. Same failure handling as [`index_server`].
pub async fn index_agent(search: &dyn SearchRepository, embeddings: &dyn EmbeddingClient, agent: &Agent) {
    let text = agent.text_for_embedding();
    let embedding = match embeddings.embed(&text).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %agent.path, error = %e, "failed to embed agent for search index");
            return;
        }
    };
    if let Err(e) = search.index_entity(agent_document(agent, embedding)).await {
        tracing::warn!(path = %agent.path, error = %e, "failed to index agent");
    }
}

/// Remove an entity from the search index by path, regardless of kind.
/// Failures are logged, never propagated.
pub async fn remove_entity(search: &dyn SearchRepository, path: &str) {
    if let Err(e) = search.remove_entity(path).await {
        tracing::warn!(path = %path, error = %e, "failed to remove entity from search index");
    }
}
