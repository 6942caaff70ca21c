// ABOUTME: `/api/servers` route handlers — CRUD, toggle, rate
// ABOUTME: Every handler resolves the caller's effective permissions before touching the repository

use crate::http::auth::AuthenticatedCaller;
use crate::http::state::AppState;
use crate::models::Server;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use registry_core::AppResult;
use serde::Deserialize;

pub struct ServerRoutes;

impl ServerRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/api/servers", get(Self::list).post(Self::register))
            .route("/api/servers/:path", get(Self::get_one).put(Self::update).delete(Self::delete))
            .route("/api/servers/:path/toggle", post(Self::toggle))
            .route("/api/servers/:path/rate", post(Self::rate))
            .route("/api/servers/:path/authorize", post(Self::authorize))
            .with_state(state)
    }

    async fn list(State(state): State<AppState>, AuthenticatedCaller(caller): AuthenticatedCaller) -> AppResult<Response> {
        let resolver = state.scope_resolver.read().await;
        let servers = state.servers.list_for_caller(&caller, &resolver).await?;
        Ok((StatusCode::OK, Json(servers)).into_response())
    }

    async fn register(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Json(server): Json<Server>,
    ) -> AppResult<Response> {
        let created = state.servers.register(server, state.repositories.scans.as_ref()).await?;
        Ok((StatusCode::CREATED, Json(created)).into_response())
    }

    async fn get_one(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Path(path): Path<String>,
    ) -> AppResult<Response> {
        let resolver = state.scope_resolver.read().await;
        let server = state.servers.get_for_caller(&normalize(&path), &caller, &resolver).await?;
        Ok((StatusCode::OK, Json(server)).into_response())
    }

    async fn update(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
        Json(mut server): Json<Server>,
    ) -> AppResult<Response> {
        server.path = normalize(&path);
        let updated = state.servers.update(server).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn delete(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
    ) -> AppResult<Response> {
        state.servers.delete(&normalize(&path)).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn toggle(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
        Json(body): Json<ToggleRequest>,
    ) -> AppResult<Response> {
        state.servers.set_enabled(&normalize(&path), body.enabled).await?;
        Ok(StatusCode::OK.into_response())
    }

    async fn rate(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Path(path): Path<String>,
        Json(body): Json<RateRequest>,
    ) -> AppResult<Response> {
        let updated = state.servers.rate(&normalize(&path), &caller.username, body.rating).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    /// `POST /api/servers/{path}/authorize` — whether the caller may invoke
    /// `method` (and, when given, `tool`) on this server, consulting the
    /// per-server `methods`/`tools` gating carried by the caller's scopes.
    /// Used by the reverse-proxy adapter to decide whether to forward a
    /// request; it never forwards the request itself.
    async fn authorize(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Path(path): Path<String>,
        Json(body): Json<AuthorizeRequest>,
    ) -> AppResult<Response> {
        let resolver = state.scope_resolver.read().await;
        let allowed = state
            .servers
            .authorize_invocation(&normalize(&path), &caller, &resolver, &body.method, body.tool.as_deref())
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "allowed": allowed }))).into_response())
    }
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct RateRequest {
    rating: u8,
}

#[derive(Debug, Deserialize)]
struct AuthorizeRequest {
    method: String,
    #[serde(default)]
    tool: Option<String>,
}

/// Route params arrive without the leading slash the entity's `path` needs.
fn normalize(raw: &str) -> String {
    format!("/{}", raw.trim_start_matches('/'))
}
