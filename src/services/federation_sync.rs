// ABOUTME: Federation sync — periodic/on-demand pull from upstream registries, idempotent upsert
// ABOUTME: Per-item errors are isolated from each other and from the overall job; nothing here ever panics the caller

use crate::models::{Agent, FederationConfig, FederationEntityType, Server, TransportType, Visibility};
use crate::repository::FederationConfigRepository;
use crate::services::agent_service::AgentService;
use crate::services::server_service::ServerService;
use registry_core::AppResult;
use serde::Deserialize;

/// The upstream-fetch adapter seam. Swappable for tests. One upstream only
/// ever speaks one entity kind (`FederationConfig::entity_type` picks which
/// method `FederationSync` calls); an upstream client that only supports one
/// kind can leave the other as its default "unsupported" error.
#[async_trait::async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch_item(
        &self,
        endpoint: &str,
        upstream_item_name: &str,
        bearer_token: Option<&str>,
    ) -> AppResult<UpstreamServerPayload>;

    async fn fetch_agent_item(
        &self,
        _endpoint: &str,
        _upstream_item_name: &str,
        _bearer_token: Option<&str>,
    ) -> AppResult<UpstreamAgentPayload> {
        Err(registry_core::AppError::unexpected("this upstream client does not support agent federation"))
    }
}

/// Shape returned by an upstream registry for one item, before transform
/// into the local [`Server`] schema.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamServerPayload {
    pub server_name: String,
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub proxy_pass_url: String,
    #[serde(default)]
    pub tool_list: Vec<crate::models::ToolDescriptor>,
}

/// Shape returned by an upstream agent directory for one item, before
/// transform into the local [`Agent`] schema.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamAgentPayload {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skills: Vec<crate::models::Skill>,
}

/// Default [`UpstreamClient`] reaching upstreams over plain HTTP GET against
/// `{endpoint}/{upstream_item_name}`. The wire shape of a specific upstream
/// is an adapter concern; this is a reasonable default transform for a
/// registry-shaped upstream.
pub struct HttpUpstreamClient {
    http: reqwest::Client,
}

impl Default for HttpUpstreamClient {
    fn default() -> Self {
        Self { http: reqwest::Client::new() }
    }
}

impl HttpUpstreamClient {
    fn get(&self, endpoint: &str, upstream_item_name: &str, bearer_token: Option<&str>) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", endpoint.trim_end_matches('/'), upstream_item_name);
        let mut request = self.http.get(url);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }
}

#[async_trait::async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn fetch_item(
        &self,
        endpoint: &str,
        upstream_item_name: &str,
        bearer_token: Option<&str>,
    ) -> AppResult<UpstreamServerPayload> {
        let response = self
            .get(endpoint, upstream_item_name, bearer_token)
            .send()
            .await
            .map_err(|e| registry_core::AppError::backend_unavailable(format!("federation fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| registry_core::AppError::backend_unavailable(format!("federation upstream error: {e}")))?;
        response
            .json::<UpstreamServerPayload>()
            .await
            .map_err(|e| registry_core::AppError::unexpected(format!("federation payload parse error: {e}")))
    }

    async fn fetch_agent_item(
        &self,
        endpoint: &str,
        upstream_item_name: &str,
        bearer_token: Option<&str>,
    ) -> AppResult<UpstreamAgentPayload> {
        let response = self
            .get(endpoint, upstream_item_name, bearer_token)
            .send()
            .await
            .map_err(|e| registry_core::AppError::backend_unavailable(format!("federation fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| registry_core::AppError::backend_unavailable(format!("federation upstream error: {e}")))?;
        response
            .json::<UpstreamAgentPayload>()
            .await
            .map_err(|e| registry_core::AppError::unexpected(format!("federation payload parse error: {e}")))
    }
}

pub struct FederationSync {
    config_repository: std::sync::Arc<dyn FederationConfigRepository>,
    upstream: std::sync::Arc<dyn UpstreamClient>,
}

/// Outcome of syncing a single item, for logging/observability.
#[derive(Debug)]
pub struct ItemOutcome {
    pub upstream_name: String,
    pub result: Result<(), String>,
}

impl FederationSync {
    #[must_use]
    pub fn new(
        config_repository: std::sync::Arc<dyn FederationConfigRepository>,
        upstream: std::sync::Arc<dyn UpstreamClient>,
    ) -> Self {
        Self {
            config_repository,
            upstream,
        }
    }

    /// Sync every enabled upstream configuration.
    ///
    /// # Errors
    /// Only fails if listing the federation configs themselves fails; every
    /// per-item and per-upstream failure is captured in the returned
    /// outcomes instead of propagating.
    pub async fn sync_all(&self, servers: &ServerService, agents: &AgentService) -> AppResult<Vec<ItemOutcome>> {
        let configs = self.config_repository.list_all().await?;
        let mut outcomes = Vec::new();
        for config in configs.into_iter().filter(|c| c.enabled) {
            outcomes.extend(self.sync_one(&config, servers, agents).await);
        }
        Ok(outcomes)
    }

    /// Sync one upstream on demand (e.g. `POST /api/federation/sync?source=`).
    pub async fn sync_upstream(
        &self,
        id: &str,
        servers: &ServerService,
        agents: &AgentService,
    ) -> AppResult<Vec<ItemOutcome>> {
        let config = self
            .config_repository
            .get(id)
            .await?
            .ok_or_else(|| registry_core::AppError::not_found(format!("federation config {id}")))?;
        Ok(self.sync_one(&config, servers, agents).await)
    }

    async fn sync_one(&self, config: &FederationConfig, servers: &ServerService, agents: &AgentService) -> Vec<ItemOutcome> {
        let bearer_token = config
            .auth_env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok());

        let mut outcomes = Vec::with_capacity(config.items.len());
        for item in config.items.iter().filter(|i| i.selected) {
            let outcome = match config.entity_type {
                FederationEntityType::Server => {
                    self.sync_server_item(config, &item.upstream_name, bearer_token.as_deref(), servers)
                        .await
                }
                FederationEntityType::Agent => {
                    self.sync_agent_item(config, &item.upstream_name, bearer_token.as_deref(), agents)
                        .await
                }
            };
            outcomes.push(ItemOutcome {
                upstream_name: item.upstream_name.clone(),
                result: outcome.map_err(|e| e.to_string()),
            });
        }
        outcomes
    }

    async fn sync_server_item(
        &self,
        config: &FederationConfig,
        upstream_item_name: &str,
        bearer_token: Option<&str>,
        servers: &ServerService,
    ) -> AppResult<()> {
        let payload = self
            .upstream
            .fetch_item(&config.endpoint, upstream_item_name, bearer_token)
            .await?;
        let path = config.synthesize_path(upstream_item_name);
        let now = chrono::Utc::now();

        let server = transform_to_server(&path, config.id.clone(), payload, now);

        match servers.get(&path).await? {
            Some(mut existing) => {
                existing.server_name = server.server_name;
                existing.description = server.description;
                existing.version = server.version;
                existing.tags = server.tags;
                existing.proxy_pass_url = server.proxy_pass_url;
                existing.tool_list = server.tool_list;
                existing.source = server.source;
                existing.is_read_only = true;
                servers.update(existing).await?;
            }
            None => {
                // Bypass security admission for federated imports: the
                // upstream is trusted by configuration, and create() alone
                // keeps the call idempotent across repeated syncs.
                servers.register_federated(server).await?;
            }
        }
        servers.set_enabled(&path, true).await?;
        Ok(())
    }

    async fn sync_agent_item(
        &self,
        config: &FederationConfig,
        upstream_item_name: &str,
        bearer_token: Option<&str>,
        agents: &AgentService,
    ) -> AppResult<()> {
        let payload = self
            .upstream
            .fetch_agent_item(&config.endpoint, upstream_item_name, bearer_token)
            .await?;
        let path = config.synthesize_path(upstream_item_name);
        let now = chrono::Utc::now();

        let agent = transform_to_agent(&path, config.id.clone(), payload, now);

        match agents.get(&path).await? {
            Some(mut existing) => {
                existing.name = agent.name;
                existing.description = agent.description;
                existing.url = agent.url;
                existing.version = agent.version;
                existing.tags = agent.tags;
                existing.skills = agent.skills;
                existing.source = agent.source;
                existing.is_read_only = true;
                agents.update(existing).await?;
            }
            None => {
                agents.register_federated(agent).await?;
            }
        }
        agents.set_enabled(&path, true).await?;
        Ok(())
    }
}

fn transform_to_server(
    path: &str,
    source: String,
    payload: UpstreamServerPayload,
    now: chrono::DateTime<chrono::Utc>,
) -> Server {
    Server {
        path: path.to_string(),
        server_name: payload.server_name,
        description: payload.description,
        version: payload.version,
        tags: payload.tags.into_iter().collect(),
        license: None,
        proxy_pass_url: payload.proxy_pass_url,
        transport_type: TransportType::StreamableHttp,
        tool_list: payload.tool_list,
        is_enabled: false,
        health_status: None,
        last_checked: None,
        registered_at: now,
        updated_at: now,
        rating_details: Vec::new(),
        source: Some(source),
        is_read_only: true,
    }
}

fn transform_to_agent(
    path: &str,
    source: String,
    payload: UpstreamAgentPayload,
    now: chrono::DateTime<chrono::Utc>,
) -> Agent {
    Agent {
        path: path.to_string(),
        name: payload.name,
        description: payload.description,
        url: payload.url,
        version: payload.version,
        protocol_version: None,
        tags: payload.tags.into_iter().collect(),
        license: None,
        skills: payload.skills,
        capabilities: std::collections::BTreeMap::new(),
        default_input_modes: Vec::new(),
        default_output_modes: Vec::new(),
        preferred_transport: None,
        security_schemes: std::collections::BTreeMap::new(),
        security: Vec::new(),
        visibility: Visibility::Public,
        allowed_groups: std::collections::BTreeSet::new(),
        trust_level: crate::models::TrustLevel::Unverified,
        is_enabled: false,
        health_status: None,
        last_checked: None,
        registered_at: now,
        updated_at: now,
        registered_by: None,
        rating_details: Vec::new(),
        source: Some(source),
        is_read_only: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_to_server_marks_federated_and_disabled() {
        let payload = UpstreamServerPayload {
            server_name: "currenttime".to_string(),
            description: "Time utilities".to_string(),
            version: None,
            tags: vec!["time".to_string()],
            proxy_pass_url: "https://upstream.example/currenttime".to_string(),
            tool_list: vec![],
        };
        let server = transform_to_server("/anthropic/currenttime", "anthropic".to_string(), payload, chrono::Utc::now());
        assert!(server.is_read_only);
        assert!(!server.is_enabled);
        assert_eq!(server.source.as_deref(), Some("anthropic"));
    }

    #[test]
    fn transform_to_agent_defaults_to_public_visibility() {
        let payload = UpstreamAgentPayload {
            name: "travel-assistant".to_string(),
            description: "Books trips".to_string(),
            url: "https://upstream.example/agents/travel-assistant".to_string(),
            version: None,
            tags: vec![],
            skills: vec![],
        };
        let agent = transform_to_agent("/asor/travel-assistant", "asor".to_string(), payload, chrono::Utc::now());
        assert!(agent.is_read_only);
        assert!(!agent.is_enabled);
        assert_eq!(agent.visibility, Visibility::Public);
        assert_eq!(agent.source.as_deref(), Some("asor"));
    }

    #[test]
    fn federation_entity_type_defaults_to_server() {
        assert_eq!(FederationEntityType::default(), FederationEntityType::Server);
    }
}
