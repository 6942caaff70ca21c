// ABOUTME: Document backend — DocumentDB/MongoDB-CE/MongoDB, one namespaced collection per entity kind
// ABOUTME: Uniqueness enforced by the `_id = path` primary key; no secondary index needed for it

pub mod agents;
pub mod codec;
pub mod collections;
pub mod federation;
pub mod scans;
pub mod scopes;
pub mod search;
pub mod servers;

pub use agents::DocumentAgentRepository;
pub use federation::DocumentFederationConfigRepository;
pub use scans::DocumentSecurityScanRepository;
pub use scopes::DocumentScopeRepository;
pub use search::DocumentSearchRepository;
pub use servers::DocumentServerRepository;

use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use registry_core::{AppError, AppResult};

/// Similarity metric used by the `mongodb` backend's native vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorSimilarityMetric {
    Cosine,
    Euclidean,
    DotProduct,
}

/// Connection and naming parameters for one of the three document-style
/// backends. Built once from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct DocumentBackendSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub use_iam: bool,
    pub direct_connection: bool,
    pub namespace: String,
    pub vector_index_name: String,
    pub vector_similarity_metric: VectorSimilarityMetric,
    pub vector_num_candidates_multiplier: u32,
    pub embeddings_dimensions: u32,
    /// Set only when the configured backend is `mongodb` (CE 8.2+/mongot).
    pub native_vector_search: bool,
}

impl DocumentBackendSettings {
    fn connection_string(&self) -> String {
        let scheme = if self.use_tls { "mongodb+srv" } else { "mongodb" };
        let auth = match (&self.username, &self.password) {
            (Some(u), Some(p)) => format!("{u}:{p}@"),
            (Some(u), None) => format!("{u}@"),
            _ => String::new(),
        };
        if self.use_tls {
            format!("{scheme}://{auth}{}/{}", self.host, self.database)
        } else {
            format!("{scheme}://{auth}{}:{}/{}", self.host, self.port, self.database)
        }
    }
}

/// All document-backend repositories sharing one process-wide client:
/// only a single process-wide client instance per backend.
pub struct DocumentRepositories {
    pub servers: DocumentServerRepository,
    pub agents: DocumentAgentRepository,
    pub scopes: DocumentScopeRepository,
    pub scans: DocumentSecurityScanRepository,
    pub federation: DocumentFederationConfigRepository,
    pub search: DocumentSearchRepository,
}

impl DocumentRepositories {
    pub async fn connect(settings: &DocumentBackendSettings) -> AppResult<Self> {
        let mut options = ClientOptions::parse(settings.connection_string())
            .await
            .map_err(|e| AppError::backend_unavailable(format!("invalid connection string: {e}")))?;
        options.direct_connection = Some(settings.direct_connection);
        let client = Client::with_options(options)
            .map_err(|e| AppError::backend_unavailable(format!("mongo client: {e}")))?;
        let db: Database = client.database(&settings.database);

        let servers = db.collection(&collections::entity_collection(
            collections::SERVERS_BASE,
            &settings.namespace,
        ));
        let agents = db.collection(&collections::entity_collection(
            collections::AGENTS_BASE,
            &settings.namespace,
        ));
        let scopes = db.collection(&collections::entity_collection(
            collections::SCOPES_BASE,
            &settings.namespace,
        ));
        let scans = db.collection(&collections::entity_collection(
            collections::SECURITY_SCANS_BASE,
            &settings.namespace,
        ));
        let federation = db.collection(&collections::entity_collection(
            collections::FEDERATION_CONFIG_BASE,
            &settings.namespace,
        ));
        let embeddings = db.collection(&collections::embeddings_collection(
            settings.embeddings_dimensions,
            &settings.namespace,
        ));

        Ok(Self {
            servers: DocumentServerRepository::new(servers),
            agents: DocumentAgentRepository::new(agents),
            scopes: DocumentScopeRepository::new(scopes),
            scans: DocumentSecurityScanRepository::new(scans),
            federation: DocumentFederationConfigRepository::new(federation),
            search: DocumentSearchRepository::new(
                embeddings,
                settings.vector_index_name.clone(),
                settings.native_vector_search,
            ),
        })
    }

    /// Create/verify the required secondary indexes for this namespace.
    ///
    /// # Errors
    /// Returns `BackendUnavailable` if index creation fails against the
    /// connected cluster.
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        use bson::doc;
        use mongodb::IndexModel;

        self.servers
            .collection_handle()
            .create_index(IndexModel::builder().keys(doc! { "is_enabled": 1, "tags": 1, "server_name": 1 }).build())
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        self.agents
            .collection_handle()
            .create_index(IndexModel::builder().keys(doc! { "is_enabled": 1, "tags": 1, "name": 1 }).build())
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        self.scans
            .collection_handle()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "server_path": 1, "scan_status": 1, "scanned_at": 1 })
                    .build(),
            )
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        self.search
            .collection_handle()
            .create_index(IndexModel::builder().keys(doc! { "entity_type": 1 }).build())
            .await
            .map_err(|e| AppError::backend_unavailable(e.to_string()))?;
        Ok(())
    }
}
