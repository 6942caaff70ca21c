// ABOUTME: Shared fixtures for the integration suite — a file-backed repository set plus deterministic embeddings
// ABOUTME: Not a `#[cfg(test)]` module: each integration test binary pulls this in via `mod support;`
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use chrono::Utc;
use registry_core::AppResult;
use registry_gateway::config::{Config, DocumentDbSettings, EmbeddingsProvider, SecurityScanSettings, StorageBackend};
use registry_gateway::models::{
    Agent, CallerContext, Server, ToolDescriptor, TransportType, TrustLevel, Visibility,
};
use registry_gateway::repository::factory::Repositories;
use registry_gateway::search::embeddings::EmbeddingClient;
use registry_gateway::services::{AgentService, ScopeResolver, SecurityAdmission, ServerService};
use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::TempDir;

/// Deterministic stand-in for a real embedding model: hashes the input into a
/// small fixed-size vector so cosine similarity behaves predictably in tests.
pub struct FakeEmbeddingClient {
    dimensions: u32,
}

impl FakeEmbeddingClient {
    #[must_use]
    pub fn new(dimensions: u32) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingClient for FakeEmbeddingClient {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector = vec![0.0f32; self.dimensions as usize];
        for (i, word) in lower.split_whitespace().enumerate() {
            let slot = word.bytes().map(u32::from).sum::<u32>() as usize % vector.len();
            vector[slot] += 1.0;
            vector[(slot + i) % vector.len()] += 0.1;
        }
        if vector.iter().all(|v| *v == 0.0) {
            vector[0] = 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }
}

pub struct Harness {
    _root: TempDir,
    pub repositories: Repositories,
    pub embeddings: Arc<FakeEmbeddingClient>,
    pub servers: ServerService,
    pub agents: AgentService,
}

fn test_config(root: &std::path::Path) -> Config {
    Config {
        http_bind_address: "127.0.0.1:0".to_string(),
        http_request_timeout_seconds: 5,
        storage_backend: StorageBackend::File,
        file_backend_root: root.to_path_buf(),
        documentdb: DocumentDbSettings {
            host: "localhost".to_string(),
            port: 27017,
            database: "registry".to_string(),
            username: None,
            password: None,
            use_tls: false,
            use_iam: false,
            direct_connection: true,
            namespace: "default".to_string(),
        },
        mongodb_vector_index_name: "vector_index".to_string(),
        mongodb_vector_similarity_metric: "cosine".to_string(),
        mongodb_vector_num_candidates_multiplier: 10,
        embeddings_provider: EmbeddingsProvider::SentenceTransformers,
        embeddings_model_name: "test-model".to_string(),
        embeddings_model_dimensions: 32,
        embeddings_api_base: "http://localhost:0".to_string(),
        embeddings_api_key_env_var: None,
        health_check_interval_seconds: 300,
        health_check_timeout_seconds: 2,
        server_security: disabled_scan_settings(),
        agent_security: disabled_scan_settings(),
        reverse_proxy_config_path: root.join("proxy_config.json"),
        federation_sync_interval_seconds: 3600,
        shutdown_timeout_seconds: 5,
        auth_jwt_secret: "test-secret".to_string(),
    }
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_scan_settings(disabled_scan_settings(), disabled_scan_settings()).await
    }

    pub async fn with_scan_settings(server_security: SecurityScanSettings, agent_security: SecurityScanSettings) -> Self {
        let root = TempDir::new().expect("tempdir");
        let mut config = test_config(root.path());
        config.server_security = server_security;
        config.agent_security = agent_security;

        let repositories = registry_gateway::repository::factory::build(&config)
            .await
            .expect("repository factory");
        let embeddings = Arc::new(FakeEmbeddingClient::new(config.embeddings_model_dimensions));

        let proxy = Arc::new(registry_gateway::services::ProxyConfigEmitter::new(
            config.reverse_proxy_config_path.clone(),
        ));
        let servers = ServerService::new(
            repositories.servers.clone(),
            repositories.search.clone(),
            embeddings.clone(),
            SecurityAdmission::new(config.server_security.clone()),
            proxy,
        );
        let agents = AgentService::new(
            repositories.agents.clone(),
            repositories.search.clone(),
            embeddings.clone(),
            SecurityAdmission::new(config.agent_security.clone()),
        );

        Self {
            _root: root,
            repositories,
            embeddings,
            servers,
            agents,
        }
    }
}

#[must_use]
pub fn disabled_scan_settings() -> SecurityScanSettings {
    SecurityScanSettings {
        enabled: false,
        scan_on_registration: false,
        timeout_seconds: 5,
        block_unsafe: false,
        command_template: String::new(),
    }
}

#[must_use]
pub fn scanning_settings(command_template: &str, block_unsafe: bool) -> SecurityScanSettings {
    SecurityScanSettings {
        enabled: true,
        scan_on_registration: true,
        timeout_seconds: 5,
        block_unsafe,
        command_template: command_template.to_string(),
    }
}

#[must_use]
pub fn sample_server(path: &str, name: &str, description: &str) -> Server {
    Server {
        path: path.to_string(),
        server_name: name.to_string(),
        description: description.to_string(),
        version: Some("1.0.0".to_string()),
        tags: BTreeSet::new(),
        license: None,
        proxy_pass_url: "http://localhost:9000".to_string(),
        transport_type: TransportType::StreamableHttp,
        tool_list: vec![ToolDescriptor {
            name: "lookup".to_string(),
            description: format!("lookup tool for {name}"),
            input_schema: None,
        }],
        is_enabled: false,
        health_status: None,
        last_checked: None,
        registered_at: Utc::now(),
        updated_at: Utc::now(),
        rating_details: Vec::new(),
        source: None,
        is_read_only: false,
    }
}

#[must_use]
pub fn sample_agent(path: &str, name: &str, visibility: Visibility) -> Agent {
    Agent {
        path: path.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
        url: "https://example.com/agent".to_string(),
        version: Some("1.0.0".to_string()),
        protocol_version: None,
        tags: BTreeSet::new(),
        license: None,
        skills: vec![],
        capabilities: Default::default(),
        default_input_modes: vec![],
        default_output_modes: vec![],
        preferred_transport: None,
        security_schemes: Default::default(),
        security: vec![],
        visibility,
        allowed_groups: BTreeSet::new(),
        trust_level: TrustLevel::Unverified,
        is_enabled: false,
        health_status: None,
        last_checked: None,
        registered_at: Utc::now(),
        updated_at: Utc::now(),
        registered_by: None,
        rating_details: vec![],
        source: None,
        is_read_only: false,
    }
}

#[must_use]
pub fn admin_caller(username: &str) -> CallerContext {
    CallerContext {
        username: username.to_string(),
        is_admin: true,
        ..Default::default()
    }
}

#[must_use]
pub fn plain_caller(username: &str, groups: &[&str]) -> CallerContext {
    CallerContext {
        username: username.to_string(),
        groups: groups.iter().map(|g| (*g).to_string()).collect(),
        ..Default::default()
    }
}

#[must_use]
pub fn empty_resolver() -> ScopeResolver {
    ScopeResolver::new(vec![])
}
