// ABOUTME: Search document and result shapes for the hybrid search engine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    McpServer,
    A2aAgent,
    McpTool,
}

/// A single indexed entity, ready for vector or client-side cosine search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    pub entity_type: EntityType,
    /// Primary key of the underlying entity (server/agent path).
    pub path: String,
    pub text: String,
    pub embedding: Vec<f32>,
    /// Lightweight snapshot rendered in results without a second repository lookup.
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub path: String,
    pub relevance_score: f64,
    #[serde(flatten)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSearchResultItem {
    pub server_path: String,
    pub tool_name: String,
    pub relevance_score: f64,
    #[serde(flatten)]
    pub metadata: serde_json::Value,
}

/// Result shape of `/api/search/semantic`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub servers: Vec<SearchResultItem>,
    #[serde(default)]
    pub agents: Vec<SearchResultItem>,
    #[serde(default)]
    pub tools: Vec<ToolSearchResultItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub entity_types: Option<Vec<EntityType>>,
    #[serde(default)]
    pub max_results: Option<usize>,
}
