// ABOUTME: Server entity service — registration admission, CRUD, rating, toggle, with index/proxy side effects
// ABOUTME: The only layer allowed to call ServerRepository directly outside of tests and the lifecycle orchestrator

use crate::models::{CallerContext, Server};
use crate::repository::{SearchRepository, ServerRepository};
use crate::search::embeddings::EmbeddingClient;
use crate::services::proxy_config::ProxyConfigEmitter;
use crate::services::scope_resolver::ScopeResolver;
use crate::services::security_admission::{security_blocked_error, SecurityAdmission};
use crate::services::validation::{validate_rating, validate_server};
use registry_core::{AppError, AppResult};
use std::sync::Arc;

pub struct ServerService {
    repository: Arc<dyn ServerRepository>,
    search: Arc<dyn SearchRepository>,
    embeddings: Arc<dyn EmbeddingClient>,
    security: SecurityAdmission,
    proxy: Arc<ProxyConfigEmitter>,
}

impl ServerService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn ServerRepository>,
        search: Arc<dyn SearchRepository>,
        embeddings: Arc<dyn EmbeddingClient>,
        security: SecurityAdmission,
        proxy: Arc<ProxyConfigEmitter>,
    ) -> Self {
        Self {
            repository,
            search,
            embeddings,
            security,
            proxy,
        }
    }

    /// Register a new server: validate, optionally scan, persist, index
    ///. The server is created disabled.
    ///
    /// # Errors
    /// `Validation` on a malformed shape, the security error kind when
    /// `block_unsafe` is set and the scan is unsafe, `AlreadyExists` on a
    /// colliding path.
    pub async fn register(&self, mut server: Server, scans: &dyn crate::repository::SecurityScanRepository) -> AppResult<Server> {
        validate_server(&server)?;
        server.is_enabled = false;

        if self.security.should_scan() {
            let result = self.security.scan(&server.path).await;
            let blocked = self.security.blocks_unsafe() && !result.is_safe;
            let severity = result.severity;
            scans.append(result).await?;
            if blocked {
                return Err(security_blocked_error(&server.path, severity));
            }
        }

        let created = self.repository.create(server).await?;
        crate::search::ingestion::index_server(self.search.as_ref(), self.embeddings.as_ref(), &created).await;
        Ok(created)
    }

    /// Create a server already transformed from a trusted upstream,
    /// bypassing the scan-on-registration step: the upstream is trusted by
    /// configuration, not by per-item scanning.
    /// Still validates shape and indexes for search.
    pub async fn register_federated(&self, mut server: Server) -> AppResult<Server> {
        validate_server(&server)?;
        server.is_enabled = false;
        let created = self.repository.create(server.clone()).await.or_else(|e| {
            if e.kind == registry_core::ErrorKind::AlreadyExists {
                server.updated_at = chrono::Utc::now();
                Ok(server)
            } else {
                Err(e)
            }
        })?;
        crate::search::ingestion::index_server(self.search.as_ref(), self.embeddings.as_ref(), &created).await;
        Ok(created)
    }

    pub async fn get(&self, path: &str) -> AppResult<Option<Server>> {
        self.repository.get(path).await
    }

    /// All servers, filtered to those `caller` is permitted to see. An
    /// unauthorized caller gets an empty list, never an error.
    pub async fn list_for_caller(&self, caller: &CallerContext, resolver: &ScopeResolver) -> AppResult<Vec<Server>> {
        let all = self.repository.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|s| resolver.can_access_server(caller, &s.path, &s.server_name))
            .collect())
    }

    /// Fetch one server, checking the scope before existence so an
    /// unauthorized caller cannot distinguish absent from hidden.
    pub async fn get_for_caller(
        &self,
        path: &str,
        caller: &CallerContext,
        resolver: &ScopeResolver,
    ) -> AppResult<Server> {
        let technical_name = crate::services::scope_resolver::technical_name(path);
        if !resolver.can_access_server(caller, path, &technical_name) {
            return Err(AppError::permission_denied(format!("no access to {path}")));
        }
        self.repository
            .get(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("server {path}")))
    }

    /// Whether `caller` may invoke `method` (and, when given, `tool`) on the
    /// named server: checks scope before existence so a caller with no
    /// visibility into the server gets the same `PermissionDenied` as one
    /// who can see it but is gated off the specific method/tool.
    pub async fn authorize_invocation(
        &self,
        path: &str,
        caller: &CallerContext,
        resolver: &ScopeResolver,
        method: &str,
        tool: Option<&str>,
    ) -> AppResult<bool> {
        let technical_name = crate::services::scope_resolver::technical_name(path);
        if !resolver.can_access_server(caller, path, &technical_name) {
            return Err(AppError::permission_denied(format!("no access to {path}")));
        }
        let server = self
            .repository
            .get(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("server {path}")))?;
        Ok(resolver.can_invoke(caller, path, &server.server_name, method, tool))
    }

    pub async fn update(&self, server: Server) -> AppResult<Server> {
        validate_server(&server)?;
        let updated = self.repository.update(server).await?;
        crate::search::ingestion::index_server(self.search.as_ref(), self.embeddings.as_ref(), &updated).await;
        Ok(updated)
    }

    pub async fn delete(&self, path: &str) -> AppResult<bool> {
        let deleted = self.repository.delete(path).await?;
        if deleted {
            crate::search::ingestion::remove_entity(self.search.as_ref(), path).await;
        }
        Ok(deleted)
    }

    /// Toggle enablement and re-emit the reverse-proxy config from the new
    /// enabled set.
    pub async fn set_enabled(&self, path: &str, enabled: bool) -> AppResult<()> {
        self.repository.set_enabled(path, enabled).await?;
        let all = self.repository.list_all().await?;
        if let Err(e) = self.proxy.emit(&all).await {
            tracing::warn!(path = %path, error = %e, "failed to emit reverse-proxy config after toggle");
        }
        Ok(())
    }

    pub async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Server> {
        validate_rating(rating)?;
        let updated = self.repository.rate(path, username, rating).await?;
        crate::search::ingestion::index_server(self.search.as_ref(), self.embeddings.as_ref(), &updated).await;
        Ok(updated)
    }
}
