// ABOUTME: Repository contracts — the uniform interface over file/document storage backends
// ABOUTME: Higher layers depend only on these traits; never on a concrete backend

#[cfg(feature = "storage-mongo")]
pub mod document;
pub mod factory;
pub mod file;
pub mod shared;

use crate::models::{
    Agent, EnabledState, EntityType, FederationConfig, Scope, SearchDocument, SecurityScanResult,
    Server,
};
use async_trait::async_trait;
use registry_core::AppResult;

/// CRUD + state contract for registered MCP servers.
#[async_trait]
pub trait ServerRepository: Send + Sync {
    async fn load_all(&self) -> AppResult<Vec<Server>>;
    async fn get(&self, path: &str) -> AppResult<Option<Server>>;
    async fn list_all(&self) -> AppResult<Vec<Server>>;
    async fn create(&self, server: Server) -> AppResult<Server>;
    async fn update(&self, server: Server) -> AppResult<Server>;
    /// Idempotent-safe: returns `false` when the path was already absent.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    async fn get_state(&self) -> AppResult<EnabledState>;
    async fn set_enabled(&self, path: &str, enabled: bool) -> AppResult<()>;

    /// Upsert a rating for `username`; recomputes `num_stars` server-side.
    async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Server>;
}

/// CRUD + state contract for registered A2A agents.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn load_all(&self) -> AppResult<Vec<Agent>>;
    async fn get(&self, path: &str) -> AppResult<Option<Agent>>;
    async fn list_all(&self) -> AppResult<Vec<Agent>>;
    async fn create(&self, agent: Agent) -> AppResult<Agent>;
    async fn update(&self, agent: Agent) -> AppResult<Agent>;
    async fn delete(&self, path: &str) -> AppResult<bool>;

    async fn get_state(&self) -> AppResult<EnabledState>;
    async fn set_enabled(&self, path: &str, enabled: bool) -> AppResult<()>;

    async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Agent>;
}

/// CRUD contract for named permission bundles.
#[async_trait]
pub trait ScopeRepository: Send + Sync {
    async fn load_all(&self) -> AppResult<Vec<Scope>>;
    async fn get(&self, name: &str) -> AppResult<Option<Scope>>;
    async fn list_all(&self) -> AppResult<Vec<Scope>>;
    async fn create(&self, scope: Scope) -> AppResult<Scope>;
    async fn update(&self, scope: Scope) -> AppResult<Scope>;
    async fn delete(&self, name: &str) -> AppResult<bool>;
}

/// Append-only contract for per-entity scanner verdicts.
#[async_trait]
pub trait SecurityScanRepository: Send + Sync {
    async fn append(&self, result: SecurityScanResult) -> AppResult<SecurityScanResult>;
    /// Most recent scan for an entity, by `scanned_at`.
    async fn current(&self, entity_path: &str) -> AppResult<Option<SecurityScanResult>>;
    async fn history(&self, entity_path: &str) -> AppResult<Vec<SecurityScanResult>>;
}

/// CRUD contract for per-upstream federation settings.
#[async_trait]
pub trait FederationConfigRepository: Send + Sync {
    async fn load_all(&self) -> AppResult<Vec<FederationConfig>>;
    async fn get(&self, id: &str) -> AppResult<Option<FederationConfig>>;
    async fn list_all(&self) -> AppResult<Vec<FederationConfig>>;
    async fn create(&self, config: FederationConfig) -> AppResult<FederationConfig>;
    async fn update(&self, config: FederationConfig) -> AppResult<FederationConfig>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Storage contract for the search index itself. Query execution
/// (hybrid ranking, native vs. client-side fallback) lives in the `search`
/// module; this trait only covers the index's own storage operations.
#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn index_entity(&self, document: SearchDocument) -> AppResult<()>;
    async fn remove_entity(&self, path: &str) -> AppResult<()>;
    /// All documents, optionally filtered by entity type — used by the
    /// client-side cosine-similarity fallback path.
    async fn all_documents(&self, entity_type: Option<EntityType>) -> AppResult<Vec<SearchDocument>>;
    /// `true` when this backend can execute a native vector-search stage.
    fn supports_native_vector_search(&self) -> bool;

    /// Run the native `$vectorSearch` stage. Only the
    /// `mongodb` backend overrides this; callers must check
    /// [`Self::supports_native_vector_search`] first and fall back to
    /// [`Self::all_documents`] plus client-side cosine similarity otherwise.
    async fn native_vector_search(
        &self,
        _query_vector: &[f32],
        _num_candidates: u32,
        _limit: usize,
        _entity_type: Option<EntityType>,
    ) -> AppResult<Vec<(SearchDocument, f64)>> {
        Err(registry_core::AppError::unexpected(
            "native vector search not supported by this backend",
        ))
    }
}
