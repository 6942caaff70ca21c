// ABOUTME: Immutable process configuration, built once from environment variables
// ABOUTME: Derived values (collection suffixes, file-backend paths, scanner command lines) are methods, never recomputed ad hoc

pub mod env_helpers;

use env_helpers::{env_bool, env_opt, env_or, env_parse};
use registry_core::{AppError, AppResult};
use std::path::PathBuf;

/// Which physical store backs every repository for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    File,
    DocumentDb,
    MongoCe,
    MongoDb,
}

impl StorageBackend {
    fn parse(s: &str) -> AppResult<Self> {
        match s {
            "file" => Ok(Self::File),
            "documentdb" => Ok(Self::DocumentDb),
            "mongodb-ce" => Ok(Self::MongoCe),
            "mongodb" => Ok(Self::MongoDb),
            other => Err(AppError::validation(format!(
                "storage_backend must be one of file|documentdb|mongodb-ce|mongodb, got '{other}'"
            ))),
        }
    }
}

/// `embeddings_provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingsProvider {
    #[default]
    SentenceTransformers,
    Litellm,
}

impl EmbeddingsProvider {
    fn parse(s: &str) -> Self {
        match s {
            "litellm" => Self::Litellm,
            _ => Self::SentenceTransformers,
        }
    }
}

/// Connection parameters shared by the three document-style backends.
#[derive(Debug, Clone)]
pub struct DocumentDbSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub use_iam: bool,
    pub direct_connection: bool,
    pub namespace: String,
}

/// Security-scanning settings shared by the server and agent admission paths.
/// `security_scan_*` and `agent_security_*` are analogous key families; we
/// keep one struct and instantiate it twice.
#[derive(Debug, Clone)]
pub struct SecurityScanSettings {
    pub enabled: bool,
    pub scan_on_registration: bool,
    pub timeout_seconds: u64,
    pub block_unsafe: bool,
    /// Command template, e.g. `mcp-scan {path}`.
    pub command_template: String,
}

/// One immutable configuration, built once at startup from environment
/// variables and thereafter read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub http_bind_address: String,
    pub http_request_timeout_seconds: u64,

    pub storage_backend: StorageBackend,
    pub file_backend_root: PathBuf,
    pub documentdb: DocumentDbSettings,

    pub mongodb_vector_index_name: String,
    pub mongodb_vector_similarity_metric: String,
    pub mongodb_vector_num_candidates_multiplier: u32,

    pub embeddings_provider: EmbeddingsProvider,
    pub embeddings_model_name: String,
    pub embeddings_model_dimensions: u32,
    pub embeddings_api_base: String,
    pub embeddings_api_key_env_var: Option<String>,

    pub health_check_interval_seconds: u64,
    pub health_check_timeout_seconds: u64,

    pub server_security: SecurityScanSettings,
    pub agent_security: SecurityScanSettings,

    pub reverse_proxy_config_path: PathBuf,

    pub federation_sync_interval_seconds: u64,

    pub shutdown_timeout_seconds: u64,

    /// HS256 secret validating the bearer token's caller-context claims
    ///. Issuance lives with the identity
    /// provider; the core only validates.
    pub auth_jwt_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `Validation` when `storage_backend` names an unknown variant.
    pub fn from_env() -> AppResult<Self> {
        let storage_backend = StorageBackend::parse(&env_or("REGISTRY_STORAGE_BACKEND", "file"))?;

        let config = Self {
            http_bind_address: env_or("REGISTRY_HTTP_BIND_ADDRESS", "0.0.0.0:8080"),
            http_request_timeout_seconds: env_parse("REGISTRY_HTTP_REQUEST_TIMEOUT_SECONDS", 30),

            storage_backend,
            file_backend_root: PathBuf::from(env_or("REGISTRY_FILE_BACKEND_ROOT", "./data")),
            documentdb: DocumentDbSettings {
                host: env_or("REGISTRY_DOCUMENTDB_HOST", "localhost"),
                port: env_parse("REGISTRY_DOCUMENTDB_PORT", 27017),
                database: env_or("REGISTRY_DOCUMENTDB_DATABASE", "registry"),
                username: env_opt("REGISTRY_DOCUMENTDB_USERNAME"),
                password: env_opt("REGISTRY_DOCUMENTDB_PASSWORD"),
                use_tls: env_bool("REGISTRY_DOCUMENTDB_USE_TLS", false),
                use_iam: env_bool("REGISTRY_DOCUMENTDB_USE_IAM", false),
                direct_connection: env_bool("REGISTRY_DOCUMENTDB_DIRECT_CONNECTION", true),
                namespace: env_or("REGISTRY_DOCUMENTDB_NAMESPACE", "default"),
            },

            mongodb_vector_index_name: env_or("REGISTRY_MONGODB_VECTOR_INDEX_NAME", "vector_index"),
            mongodb_vector_similarity_metric: env_or("REGISTRY_MONGODB_VECTOR_SIMILARITY_METRIC", "cosine"),
            mongodb_vector_num_candidates_multiplier: env_parse(
                "REGISTRY_MONGODB_VECTOR_NUM_CANDIDATES_MULTIPLIER",
                10,
            ),

            embeddings_provider: EmbeddingsProvider::parse(&env_or("REGISTRY_EMBEDDINGS_PROVIDER", "sentence-transformers")),
            embeddings_model_name: env_or("REGISTRY_EMBEDDINGS_MODEL_NAME", "all-MiniLM-L6-v2"),
            embeddings_model_dimensions: env_parse("REGISTRY_EMBEDDINGS_MODEL_DIMENSIONS", 384),
            embeddings_api_base: env_or("REGISTRY_EMBEDDINGS_API_BASE", "http://localhost:8081"),
            embeddings_api_key_env_var: env_opt("REGISTRY_EMBEDDINGS_API_KEY_ENV_VAR"),

            health_check_interval_seconds: env_parse(
                "REGISTRY_HEALTH_CHECK_INTERVAL_SECONDS",
                registry_core::constants::health::DEFAULT_CHECK_INTERVAL_SECONDS,
            ),
            health_check_timeout_seconds: env_parse(
                "REGISTRY_HEALTH_CHECK_TIMEOUT_SECONDS",
                registry_core::constants::health::DEFAULT_CHECK_TIMEOUT_SECONDS,
            ),

            server_security: SecurityScanSettings {
                enabled: env_bool("REGISTRY_SECURITY_SCAN_ENABLED", false),
                scan_on_registration: env_bool("REGISTRY_SECURITY_SCAN_ON_REGISTRATION", false),
                timeout_seconds: env_parse(
                    "REGISTRY_SECURITY_SCAN_TIMEOUT",
                    registry_core::constants::security::DEFAULT_SCAN_TIMEOUT_SECONDS,
                ),
                block_unsafe: env_bool("REGISTRY_SECURITY_BLOCK_UNSAFE_SERVERS", false),
                command_template: env_or("REGISTRY_SECURITY_SCAN_COMMAND", "mcp-scan {path}"),
            },
            agent_security: SecurityScanSettings {
                enabled: env_bool("REGISTRY_AGENT_SECURITY_SCAN_ENABLED", false),
                scan_on_registration: env_bool("REGISTRY_AGENT_SECURITY_SCAN_ON_REGISTRATION", false),
                timeout_seconds: env_parse(
                    "REGISTRY_AGENT_SECURITY_SCAN_TIMEOUT",
                    registry_core::constants::security::DEFAULT_SCAN_TIMEOUT_SECONDS,
                ),
                block_unsafe: env_bool("REGISTRY_AGENT_SECURITY_BLOCK_UNSAFE_AGENTS", false),
                command_template: env_or("REGISTRY_AGENT_SECURITY_SCAN_COMMAND", "a2a-scan {path}"),
            },

            reverse_proxy_config_path: PathBuf::from(env_or(
                "REGISTRY_REVERSE_PROXY_CONFIG_PATH",
                "./data/proxy_config.json",
            )),

            federation_sync_interval_seconds: env_parse("REGISTRY_FEDERATION_SYNC_INTERVAL_SECONDS", 3600),

            shutdown_timeout_seconds: env_parse("REGISTRY_SHUTDOWN_TIMEOUT_SECONDS", 30),

            auth_jwt_secret: env_opt("REGISTRY_AUTH_JWT_SECRET").unwrap_or_else(|| {
                tracing::warn!("REGISTRY_AUTH_JWT_SECRET not set; using an insecure development default");
                "insecure-development-secret".to_string()
            }),
        };

        tracing::info!(
            storage_backend = ?config.storage_backend,
            http_bind_address = %config.http_bind_address,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Namespaced collection name with the embeddings dimension suffix.
    #[must_use]
    pub fn embeddings_collection_name(&self) -> String {
        format!(
            "mcp_embeddings_{}_{}",
            self.embeddings_model_dimensions, self.documentdb.namespace
        )
    }

    /// Effective API key for the configured embeddings provider, read from
    /// whichever environment variable `embeddings_api_key_env_var` names; a
    /// missing config falls back to `REGISTRY_EMBEDDINGS_API_KEY`.
    #[must_use]
    pub fn embeddings_api_key(&self) -> Option<String> {
        let var_name = self
            .embeddings_api_key_env_var
            .as_deref()
            .unwrap_or("REGISTRY_EMBEDDINGS_API_KEY");
        std::env::var(var_name).ok()
    }

    /// Render the scanner command line for one entity path, substituting the
    /// `{path}` placeholder in `command_template`.
    #[must_use]
    pub fn render_scan_command(template: &str, path: &str) -> String {
        template.replace("{path}", path)
    }
}
