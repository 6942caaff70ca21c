// ABOUTME: Health monitor — periodic probing of enabled servers, in-memory state cache, on-demand checks
// ABOUTME: Failed probes never disable a server automatically; they only update cached status

use crate::repository::ServerRepository;
use dashmap::DashMap;
use registry_core::AppResult;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

impl ProbeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedHealth {
    pub status: ProbeStatus,
    pub checked_at: chrono::DateTime<chrono::Utc>,
    pub consecutive_failures: u32,
}

/// Probes enabled MCP server endpoints on an interval and caches their
/// status in memory. A probe succeeds on any
/// `2xx`/`3xx` response within the timeout; anything else, including a
/// connection failure, counts as failed.
/// Consecutive-failure counts are tracked per server but never cause an
/// auto-disable.
pub struct HealthMonitor {
    repository: Arc<dyn ServerRepository>,
    http: reqwest::Client,
    cache: DashMap<String, CachedHealth>,
    failure_streaks: DashMap<String, AtomicU32>,
    on_demand_timeout: Duration,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(repository: Arc<dyn ServerRepository>, on_demand_timeout: Duration) -> Self {
        Self {
            repository,
            http: reqwest::Client::new(),
            cache: DashMap::new(),
            failure_streaks: DashMap::new(),
            on_demand_timeout,
        }
    }

    /// Probe every currently-enabled server once, with the given per-probe
    /// timeout. Used by the periodic sweep.
    pub async fn probe_all_enabled(&self, timeout: Duration) -> AppResult<()> {
        let servers = self.repository.list_all().await?;
        for server in servers.into_iter().filter(|s| s.is_enabled) {
            self.probe_one(&server.path, &server.proxy_pass_url, timeout).await;
        }
        Ok(())
    }

    /// User-initiated check for a single path with the faster on-demand
    /// timeout.
    pub async fn check_now(&self, path: &str) -> AppResult<CachedHealth> {
        let Some(server) = self.repository.get(path).await? else {
            return Err(registry_core::AppError::not_found(format!("server {path}")));
        };
        self.probe_one(&server.path, &server.proxy_pass_url, self.on_demand_timeout).await;
        Ok(self.cached(path))
    }

    /// Cached status for `path`, if it has ever been probed.
    #[must_use]
    pub fn cached(&self, path: &str) -> CachedHealth {
        self.cache.get(path).map_or_else(
            || CachedHealth {
                status: ProbeStatus::Unhealthy,
                checked_at: chrono::Utc::now(),
                consecutive_failures: 0,
            },
            |entry| entry.clone(),
        )
    }

    async fn probe_one(&self, path: &str, url: &str, timeout: Duration) {
        let result = tokio::time::timeout(timeout, self.http.get(url).send()).await;
        let healthy = matches!(&result, Ok(Ok(response)) if response.status().is_success() || response.status().is_redirection());

        let streak = self
            .failure_streaks
            .entry(path.to_string())
            .or_insert_with(|| AtomicU32::new(0));
        let consecutive_failures = if healthy {
            streak.store(0, Ordering::SeqCst);
            0
        } else {
            streak.fetch_add(1, Ordering::SeqCst) + 1
        };

        let status = if healthy { ProbeStatus::Healthy } else { ProbeStatus::Unhealthy };
        let checked_at = chrono::Utc::now();
        self.cache.insert(
            path.to_string(),
            CachedHealth {
                status,
                checked_at,
                consecutive_failures,
            },
        );

        if let Ok(Some(mut server)) = self.repository.get(path).await {
            server.health_status = Some(status.as_str().to_string());
            server.last_checked = Some(checked_at);
            if let Err(e) = self.repository.update(server).await {
                tracing::warn!(path = %path, error = %e, "failed to persist health status");
            }
        }

        if !healthy {
            tracing::debug!(path = %path, consecutive_failures, "health probe failed");
        }
    }
}
