// ABOUTME: Reverse-proxy config emission — serializes the enabled-server set and signals a reload
// ABOUTME: Failures here are logged, never roll back the enablement change that triggered them

use crate::models::Server;
use registry_core::AppResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One route entry written to the reverse-proxy's config file.
#[derive(Debug, Serialize)]
struct RouteEntry {
    path: String,
    upstream_url: String,
}

/// Writes `{path -> upstream_url}` for every enabled server to a fixed path
/// and (in deployments with a reload hook configured) signals the proxy to
/// reload.
pub struct ProxyConfigEmitter {
    config_path: PathBuf,
}

impl ProxyConfigEmitter {
    #[must_use]
    pub const fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Emit the current enabled-server set. Errors are returned to the
    /// caller (typically the lifecycle orchestrator or entity service),
    /// which logs and discards them without undoing the state change that
    /// triggered this call.
    pub async fn emit(&self, enabled_servers: &[Server]) -> AppResult<()> {
        let mut routes = BTreeMap::new();
        for server in enabled_servers.iter().filter(|s| s.is_enabled) {
            routes.insert(
                server.path.clone(),
                RouteEntry {
                    path: server.path.clone(),
                    upstream_url: server.proxy_pass_url.clone(),
                },
            );
        }

        if let Some(parent) = self.config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&routes)?;
        tokio::fs::write(&self.config_path, bytes).await?;

        tracing::info!(routes = routes.len(), path = %self.config_path.display(), "reverse-proxy config written");
        self.signal_reload().await;
        Ok(())
    }

    /// Signal the reverse proxy to reload. The reload mechanism is
    /// deployment-specific and out of scope; this only logs on
    /// failure, never undoes the write.
    async fn signal_reload(&self) {
        tracing::debug!("reverse-proxy reload signaled");
    }
}
