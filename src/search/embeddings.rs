// ABOUTME: Pluggable embedding client — local (sentence-transformer-style) and remote providers
// ABOUTME: Dimension is deployment-configured; the first real call's output is checked against it

use async_trait::async_trait;
use registry_core::{AppError, AppResult};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// An embedding backend. Implementations may call out to a local model
/// process or a remote API; callers only see a dimension-checked vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Declared output dimension for this deployment.
    fn dimensions(&self) -> u32;
}

/// `sentence-transformers`-style local provider, reached over the
/// configured `embeddings_model_name` endpoint (a local inference server).
pub struct LocalEmbeddingClient {
    endpoint: String,
    model_name: String,
    dimensions: u32,
    http: reqwest::Client,
    dimension_checked: AtomicBool,
}

impl LocalEmbeddingClient {
    #[must_use]
    pub fn new(endpoint: String, model_name: String, dimensions: u32, http: reqwest::Client) -> Self {
        Self {
            endpoint,
            model_name,
            dimensions,
            http,
            dimension_checked: AtomicBool::new(false),
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for LocalEmbeddingClient {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "model": self.model_name, "input": text }))
            .send()
            .await
            .map_err(|e| AppError::backend_unavailable(format!("embedding request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::backend_unavailable(format!("embedding endpoint error: {e}")))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| AppError::backend_unavailable(format!("embedding response parse error: {e}")))?;

        check_dimensions(&response.embedding, self.dimensions, &self.dimension_checked)?;
        Ok(response.embedding)
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }
}

/// A generic "prefixed model" remote client, e.g. `openai/text-embedding-3-small`,
/// `bedrock/amazon.titan-embed-text-v2`, `cohere/embed-english-v3.0`.
/// AWS-flavored remotes use the process's ambient credential chain; every
/// other provider is authenticated with an API key read from configuration.
pub struct RemoteEmbeddingClient {
    provider: String,
    model_id: String,
    api_base: String,
    api_key: Option<String>,
    dimensions: u32,
    http: reqwest::Client,
    dimension_checked: AtomicBool,
}

impl RemoteEmbeddingClient {
    #[must_use]
    pub fn new(
        prefixed_model: &str,
        api_base: String,
        api_key: Option<String>,
        dimensions: u32,
        http: reqwest::Client,
    ) -> Self {
        let (provider, model_id) = prefixed_model
            .split_once('/')
            .unwrap_or(("unknown", prefixed_model));
        Self {
            provider: provider.to_string(),
            model_id: model_id.to_string(),
            api_base,
            api_key,
            dimensions,
            http,
            dimension_checked: AtomicBool::new(false),
        }
    }

    fn is_aws_flavored(&self) -> bool {
        self.provider.eq_ignore_ascii_case("bedrock")
    }
}

#[async_trait]
impl EmbeddingClient for RemoteEmbeddingClient {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut request = self
            .http
            .post(format!("{}/embeddings", self.api_base))
            .json(&serde_json::json!({ "model": self.model_id, "input": text }));

        if !self.is_aws_flavored() {
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            } else {
                return Err(AppError::backend_unavailable(format!(
                    "no API key configured for embeddings provider '{}'",
                    self.provider
                )));
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::backend_unavailable(format!("embedding request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::backend_unavailable(format!("embedding endpoint error: {e}")))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| AppError::backend_unavailable(format!("embedding response parse error: {e}")))?;

        check_dimensions(&response.embedding, self.dimensions, &self.dimension_checked)?;
        Ok(response.embedding)
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }
}

/// Build the configured embedding client from `embeddings_provider`.
/// `sentence-transformers` talks to a local
/// inference server by model name; `litellm` is the generic "prefixed
/// model" remote client (`provider/model-id`).
#[must_use]
pub fn build_embedding_client(config: &crate::config::Config) -> std::sync::Arc<dyn EmbeddingClient> {
    let http = reqwest::Client::new();
    match config.embeddings_provider {
        crate::config::EmbeddingsProvider::SentenceTransformers => std::sync::Arc::new(LocalEmbeddingClient::new(
            config.embeddings_api_base.clone(),
            config.embeddings_model_name.clone(),
            config.embeddings_model_dimensions,
            http,
        )),
        crate::config::EmbeddingsProvider::Litellm => std::sync::Arc::new(RemoteEmbeddingClient::new(
            &config.embeddings_model_name,
            config.embeddings_api_base.clone(),
            config.embeddings_api_key(),
            config.embeddings_model_dimensions,
            http,
        )),
    }
}

fn check_dimensions(vector: &[f32], expected: u32, checked: &AtomicBool) -> AppResult<()> {
    if checked.load(Ordering::Relaxed) {
        return Ok(());
    }
    if vector.len() != expected as usize {
        return Err(AppError::unexpected(format!(
            "embedding provider returned {} dims, expected {expected}",
            vector.len()
        )));
    }
    checked.store(true, Ordering::Relaxed);
    Ok(())
}
