// ABOUTME: Agent entity service — registration admission, CRUD, rating, toggle, with index side effects
// ABOUTME: Mirrors ServerService; agents have no reverse-proxy route so there is no proxy-emission step

use crate::models::{Agent, CallerContext};
use crate::repository::{AgentRepository, SearchRepository};
use crate::search::embeddings::EmbeddingClient;
use crate::services::scope_resolver::ScopeResolver;
use crate::services::security_admission::{security_blocked_error, SecurityAdmission};
use crate::services::validation::{validate_agent, validate_rating};
use registry_core::{AppError, AppResult};
use std::sync::Arc;

pub struct AgentService {
    repository: Arc<dyn AgentRepository>,
    search: Arc<dyn SearchRepository>,
    embeddings: Arc<dyn EmbeddingClient>,
    security: SecurityAdmission,
}

impl AgentService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn AgentRepository>,
        search: Arc<dyn SearchRepository>,
        embeddings: Arc<dyn EmbeddingClient>,
        security: SecurityAdmission,
    ) -> Self {
        Self {
            repository,
            search,
            embeddings,
            security,
        }
    }

    /// Register a new agent, auto-generating `path` from `name` when absent
    ///.
    ///
    /// # Errors
    /// See [`crate::services::server_service::ServerService::register`].
    pub async fn register(&self, mut agent: Agent, scans: &dyn crate::repository::SecurityScanRepository) -> AppResult<Agent> {
        if agent.path.trim().is_empty() {
            agent.path = slugify_path(&agent.name);
        }
        validate_agent(&agent)?;
        agent.is_enabled = false;

        if self.security.should_scan() {
            let result = self.security.scan(&agent.path).await;
            let blocked = self.security.blocks_unsafe() && !result.is_safe;
            let severity = result.severity;
            scans.append(result).await?;
            if blocked {
                return Err(security_blocked_error(&agent.path, severity));
            }
        }

        let created = self.repository.create(agent).await?;
        crate::search::ingestion::index_agent(self.search.as_ref(), self.embeddings.as_ref(), &created).await;
        Ok(created)
    }

    /// Create an agent already transformed from a trusted federated
    /// upstream, bypassing the scan-on-registration step and tolerating a
    /// colliding path so repeated syncs stay idempotent.
    pub async fn register_federated(&self, mut agent: Agent) -> AppResult<Agent> {
        validate_agent(&agent)?;
        agent.is_enabled = false;
        let created = self.repository.create(agent.clone()).await.or_else(|e| {
            if e.kind == registry_core::ErrorKind::AlreadyExists {
                agent.updated_at = chrono::Utc::now();
                Ok(agent)
            } else {
                Err(e)
            }
        })?;
        crate::search::ingestion::index_agent(self.search.as_ref(), self.embeddings.as_ref(), &created).await;
        Ok(created)
    }

    pub async fn get(&self, path: &str) -> AppResult<Option<Agent>> {
        self.repository.get(path).await
    }

    pub async fn list_for_caller(&self, caller: &CallerContext, resolver: &ScopeResolver) -> AppResult<Vec<Agent>> {
        let all = self.repository.list_all().await?;
        Ok(all.into_iter().filter(|a| resolver.can_access_agent(caller, a)).collect())
    }

    pub async fn get_for_caller(
        &self,
        path: &str,
        caller: &CallerContext,
        resolver: &ScopeResolver,
    ) -> AppResult<Agent> {
        let agent = self
            .repository
            .get(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("agent {path}")))?;
        if !resolver.can_access_agent(caller, &agent) {
            return Err(AppError::permission_denied(format!("no access to {path}")));
        }
        Ok(agent)
    }

    pub async fn update(&self, agent: Agent) -> AppResult<Agent> {
        validate_agent(&agent)?;
        let updated = self.repository.update(agent).await?;
        crate::search::ingestion::index_agent(self.search.as_ref(), self.embeddings.as_ref(), &updated).await;
        Ok(updated)
    }

    pub async fn delete(&self, path: &str) -> AppResult<bool> {
        let deleted = self.repository.delete(path).await?;
        if deleted {
            crate::search::ingestion::remove_entity(self.search.as_ref(), path).await;
        }
        Ok(deleted)
    }

    pub async fn set_enabled(&self, path: &str, enabled: bool) -> AppResult<()> {
        self.repository.set_enabled(path, enabled).await
    }

    pub async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Agent> {
        validate_rating(rating)?;
        let updated = self.repository.rate(path, username, rating).await?;
        crate::search::ingestion::index_agent(self.search.as_ref(), self.embeddings.as_ref(), &updated).await;
        Ok(updated)
    }
}

/// Derive a `/slug` path from a free-form agent name.
#[must_use]
fn slugify_path(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let trimmed = slug.trim_matches('-');
    let collapsed = trimmed.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-");
    format!("/{collapsed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_simple_name() {
        assert_eq!(slugify_path("Weather Agent"), "/weather-agent");
    }

    #[test]
    fn slugifies_punctuation_and_repeats_dashes() {
        assert_eq!(slugify_path("Bob's   Agent!!"), "/bob-s-agent");
    }
}
