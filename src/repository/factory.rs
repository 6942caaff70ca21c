// ABOUTME: Process-wide repository factory — selects the concrete backend once at startup
// ABOUTME: Higher layers only ever see the trait objects in `Repositories`; they never branch on backend

#[cfg(feature = "storage-mongo")]
use super::document::{DocumentBackendSettings, DocumentRepositories, VectorSimilarityMetric};
use super::file::FileRepositories;
use super::{
    AgentRepository, FederationConfigRepository, ScopeRepository, SearchRepository,
    SecurityScanRepository, ServerRepository,
};
use crate::config::{Config, StorageBackend};
use registry_core::AppResult;
use std::sync::Arc;

/// The fully wired set of repositories for one process, built once by
/// [`build`] and shared via `Arc` thereafter.
pub struct Repositories {
    pub servers: Arc<dyn ServerRepository>,
    pub agents: Arc<dyn AgentRepository>,
    pub scopes: Arc<dyn ScopeRepository>,
    pub scans: Arc<dyn SecurityScanRepository>,
    pub federation: Arc<dyn FederationConfigRepository>,
    pub search: Arc<dyn SearchRepository>,
}

/// Select and construct the concrete backend named by `config.storage_backend`.
///
/// # Errors
/// Returns `BackendUnavailable` if the configured backend cannot be reached
/// (document backends) or its base directory cannot be created (file backend).
pub async fn build(config: &Config) -> AppResult<Repositories> {
    match config.storage_backend {
        StorageBackend::File => {
            let repos = FileRepositories::new(&config.file_backend_root).await?;
            let local_index = crate::search::local::LocalFileSearchRepository::new(
                config.file_backend_root.join("search_index.json"),
            )
            .await?;
            tracing::info!(backend = "file", "repository factory selected file backend");
            Ok(Repositories {
                servers: Arc::new(repos.servers),
                agents: Arc::new(repos.agents),
                scopes: Arc::new(repos.scopes),
                scans: Arc::new(repos.scans),
                federation: Arc::new(repos.federation),
                search: Arc::new(local_index),
            })
        }
        StorageBackend::DocumentDb | StorageBackend::MongoCe | StorageBackend::MongoDb => {
            #[cfg(feature = "storage-mongo")]
            {
                let native_vector_search = matches!(config.storage_backend, StorageBackend::MongoDb);
                let settings = DocumentBackendSettings {
                    host: config.documentdb.host.clone(),
                    port: config.documentdb.port,
                    database: config.documentdb.database.clone(),
                    username: config.documentdb.username.clone(),
                    password: config.documentdb.password.clone(),
                    use_tls: config.documentdb.use_tls,
                    use_iam: config.documentdb.use_iam,
                    direct_connection: config.documentdb.direct_connection,
                    namespace: config.documentdb.namespace.clone(),
                    vector_index_name: config.mongodb_vector_index_name.clone(),
                    vector_similarity_metric: match config.mongodb_vector_similarity_metric.as_str() {
                        "euclidean" => VectorSimilarityMetric::Euclidean,
                        "dotProduct" => VectorSimilarityMetric::DotProduct,
                        _ => VectorSimilarityMetric::Cosine,
                    },
                    vector_num_candidates_multiplier: config.mongodb_vector_num_candidates_multiplier,
                    embeddings_dimensions: config.embeddings_model_dimensions,
                    native_vector_search,
                };
                let repos = DocumentRepositories::connect(&settings).await?;
                tracing::info!(
                    backend = ?config.storage_backend,
                    native_vector_search,
                    "repository factory selected document backend"
                );
                Ok(Repositories {
                    servers: Arc::new(repos.servers),
                    agents: Arc::new(repos.agents),
                    scopes: Arc::new(repos.scopes),
                    scans: Arc::new(repos.scans),
                    federation: Arc::new(repos.federation),
                    search: Arc::new(repos.search),
                })
            }
            #[cfg(not(feature = "storage-mongo"))]
            {
                Err(registry_core::AppError::backend_unavailable(
                    "this build was compiled without the `storage-mongo` feature",
                ))
            }
        }
    }
}
