// ABOUTME: Lifecycle orchestrator — startup loading, index warmup, proxy emission, shutdown choreography
// ABOUTME: Owns the ordered startup sequence and the bounded shutdown; every other service is built before this runs

use crate::repository::factory::Repositories;
use crate::services::federation_sync::FederationSync;
use crate::services::health_monitor::HealthMonitor;
use crate::services::proxy_config::ProxyConfigEmitter;
use crate::services::agent_service::AgentService;
use crate::services::scope_resolver::ScopeResolver;
use crate::services::server_service::ServerService;
use crate::services::task_manager::TaskManager;
use registry_core::constants::startup::{
    SCOPE_LOAD_BACKOFF_BASE, SCOPE_LOAD_INITIAL_DELAY_SECONDS, SCOPE_LOAD_MAX_ATTEMPTS,
};
use registry_core::AppResult;
use std::sync::Arc;
use std::time::Duration;

pub struct Lifecycle {
    pub repositories: Arc<Repositories>,
    pub embeddings: Arc<dyn crate::search::embeddings::EmbeddingClient>,
    pub task_manager: Arc<TaskManager>,
    pub servers: Arc<ServerService>,
    pub agents: Arc<AgentService>,
    pub health_monitor: Arc<HealthMonitor>,
    pub federation: Arc<FederationSync>,
    pub proxy: Arc<ProxyConfigEmitter>,
}

impl Lifecycle {
    /// Run the ordered startup sequence:
    /// 1. load scopes (retry with backoff)
    /// 2. load servers and agents
    /// 3. initialize the search index (warm by re-indexing every entity)
    /// 4. initialize the health monitor (handled by construction)
    /// 5. federation sync-on-startup
    /// 6. emit the reverse-proxy config
    ///
    /// # Errors
    /// Returns `Err` only when scope loading exhausts its retry budget;
    /// every later step logs and continues past per-entity/per-item
    /// failures rather than aborting startup.
    pub async fn startup(&self) -> AppResult<ScopeResolver> {
        let scopes = self.load_scopes_with_retry().await?;
        let resolver = ScopeResolver::new(scopes);

        let servers = self.repositories.servers.load_all().await?;
        let agents = self.repositories.agents.load_all().await?;
        tracing::info!(servers = servers.len(), agents = agents.len(), "loaded entities at startup");

        self.warm_search_index(&servers, &agents).await;

        let federation_configs = self.repositories.federation.load_all().await?;
        for config in federation_configs.iter().filter(|c| c.enabled && c.sync_on_startup) {
            match self.federation.sync_upstream(&config.id, &self.servers, &self.agents).await {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        match outcome.result {
                            Ok(()) => tracing::info!(upstream = %config.id, item = %outcome.upstream_name, "federation item synced"),
                            Err(e) => tracing::warn!(upstream = %config.id, item = %outcome.upstream_name, error = %e, "federation item failed"),
                        }
                    }
                }
                Err(e) => tracing::warn!(upstream = %config.id, error = %e, "startup federation sync failed"),
            }
        }

        let enabled_servers = self.repositories.servers.list_all().await?;
        if let Err(e) = self.proxy.emit(&enabled_servers).await {
            tracing::warn!(error = %e, "failed to emit reverse-proxy config at startup");
        }

        Ok(resolver)
    }

    async fn load_scopes_with_retry(&self) -> AppResult<Vec<crate::models::Scope>> {
        let mut delay = Duration::from_secs(SCOPE_LOAD_INITIAL_DELAY_SECONDS);
        let mut last_error = None;
        for attempt in 1..=SCOPE_LOAD_MAX_ATTEMPTS {
            match self.repositories.scopes.load_all().await {
                Ok(scopes) => return Ok(scopes),
                Err(e) => {
                    tracing::warn!(attempt, max_attempts = SCOPE_LOAD_MAX_ATTEMPTS, error = %e, "scope load failed, retrying");
                    last_error = Some(e);
                    if attempt < SCOPE_LOAD_MAX_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= SCOPE_LOAD_BACKOFF_BASE;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| registry_core::AppError::backend_unavailable("scope load exhausted retries")))
    }

    /// Re-index every known entity; a per-entity embedding or index failure
    /// is logged and never aborts warmup.
    async fn warm_search_index(&self, servers: &[crate::models::Server], agents: &[crate::models::Agent]) {
        for server in servers {
            crate::search::ingestion::index_server(
                self.repositories.search.as_ref(),
                self.servers_embeddings(),
                server,
            )
            .await;
            tokio::task::yield_now().await;
        }
        for agent in agents {
            crate::search::ingestion::index_agent(self.repositories.search.as_ref(), self.servers_embeddings(), agent)
                .await;
            tokio::task::yield_now().await;
        }
    }

    fn servers_embeddings(&self) -> &dyn crate::search::embeddings::EmbeddingClient {
        self.embeddings.as_ref()
    }

    /// Await task-manager shutdown with a bounded timeout.
    pub async fn shutdown(&self, timeout: Duration) {
        self.task_manager.shutdown(timeout).await;
        tracing::info!("background tasks drained, repository clients closing");
    }
}
