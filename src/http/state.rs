// ABOUTME: Shared application state handed to every axum handler
// ABOUTME: Built once in the binary's main() and injected; nothing here is a global singleton

use crate::config::Config;
use crate::repository::factory::Repositories;
use crate::repository::ScopeRepository as _;
use crate::search::embeddings::EmbeddingClient;
use crate::search::SearchEngine;
use crate::services::scope_resolver::ScopeResolver;
use crate::services::{AgentService, FederationSync, HealthMonitor, ProxyConfigEmitter, ServerService, TaskManager};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything an HTTP handler needs, injected once at startup and cloned
/// cheaply per request via `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repositories: Arc<Repositories>,
    pub servers: Arc<ServerService>,
    pub agents: Arc<AgentService>,
    pub search_engine: Arc<SearchEngine>,
    pub health_monitor: Arc<HealthMonitor>,
    pub federation: Arc<FederationSync>,
    pub proxy: Arc<ProxyConfigEmitter>,
    pub task_manager: Arc<TaskManager>,
    pub embeddings: Arc<dyn EmbeddingClient>,
    /// Refreshed whenever scopes change; read on every permission check.
    pub scope_resolver: Arc<RwLock<ScopeResolver>>,
}

impl AppState {
    /// Rebuild the cached [`ScopeResolver`] from the repository (called
    /// after any scope CRUD operation).
    pub async fn refresh_scope_resolver(&self) -> registry_core::AppResult<()> {
        let scopes = self.repositories.scopes.list_all().await?;
        *self.scope_resolver.write().await = ScopeResolver::new(scopes);
        Ok(())
    }
}
