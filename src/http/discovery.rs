// ABOUTME: Anthropic-compatible read-only discovery API — `ServerDetail` listing with cursor pagination
// ABOUTME: Public: no bearer-token requirement, only enabled servers are exposed

use crate::http::state::AppState;
use crate::models::Server;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use registry_core::pagination::{Cursor, CursorPage};
use registry_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Anthropic registry API `ServerDetail` shape.
#[derive(Debug, Serialize)]
struct ServerDetail {
    /// Reverse-DNS form, e.g. `io.example.registry/currenttime`.
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
    packages: Vec<serde_json::Value>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    meta: Option<serde_json::Value>,
}

const REVERSE_DNS_PREFIX: &str = "io.example.registry";

impl ServerDetail {
    fn from_server(server: &Server) -> Self {
        Self {
            name: format!("{REVERSE_DNS_PREFIX}{}", server.path),
            description: server.description.clone(),
            version: server.version.clone(),
            title: Some(server.server_name.clone()),
            repository: None,
            packages: Vec::new(),
            meta: Some(serde_json::json!({
                "path": server.path,
                "transport_type": server.transport_type,
                "num_tools": server.num_tools(),
                "num_stars": server.num_stars(),
            })),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ListQuery {
    cursor: Option<String>,
    #[serde(default = "default_page_size")]
    limit: usize,
}

const fn default_page_size() -> usize {
    30
}

pub struct DiscoveryRoutes;

impl DiscoveryRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/v0/servers", get(Self::list))
            .route("/v0/servers/:path", get(Self::get_one))
            .with_state(state)
    }

    /// Stable ordering by `server_name`, paginated by an opaque cursor
    /// encoding the last-seen name.
    async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> AppResult<Response> {
        let mut servers = state.repositories.servers.list_all().await?;
        servers.retain(|s| s.is_enabled);
        servers.sort_by(|a, b| a.server_name.cmp(&b.server_name));

        let start = match query.cursor.as_deref().map(|c| Cursor::from_string(c.to_string())) {
            Some(cursor) => {
                let last_name = cursor.decode().unwrap_or_default();
                servers.iter().position(|s| s.server_name > last_name).unwrap_or(servers.len())
            }
            None => 0,
        };

        let page_size = query.limit.max(1);
        let end = (start + page_size).min(servers.len());
        let page_items = &servers[start..end];

        let next_cursor = if end < servers.len() {
            page_items.last().map(|s| Cursor::new(&s.server_name))
        } else {
            None
        };

        let items: Vec<ServerDetail> = page_items.iter().map(ServerDetail::from_server).collect();
        Ok((StatusCode::OK, Json(CursorPage::new(items, next_cursor))).into_response())
    }

    async fn get_one(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
        let normalized = format!("/{}", path.trim_start_matches('/'));
        let server = state
            .repositories
            .servers
            .get(&normalized)
            .await?
            .filter(|s| s.is_enabled)
            .ok_or_else(|| AppError::not_found(format!("server {normalized}")))?;
        Ok((StatusCode::OK, Json(ServerDetail::from_server(&server))).into_response())
    }
}
