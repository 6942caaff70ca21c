// ABOUTME: `/api/agents` route handlers — mirrors servers.rs; no reverse-proxy toggle side effect

use crate::http::auth::AuthenticatedCaller;
use crate::http::state::AppState;
use crate::models::Agent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use registry_core::AppResult;
use serde::Deserialize;

pub struct AgentRoutes;

impl AgentRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/api/agents", get(Self::list).post(Self::register))
            .route("/api/agents/:path", get(Self::get_one).put(Self::update).delete(Self::delete))
            .route("/api/agents/:path/toggle", post(Self::toggle))
            .route("/api/agents/:path/rate", post(Self::rate))
            .with_state(state)
    }

    async fn list(State(state): State<AppState>, AuthenticatedCaller(caller): AuthenticatedCaller) -> AppResult<Response> {
        let resolver = state.scope_resolver.read().await;
        let agents = state.agents.list_for_caller(&caller, &resolver).await?;
        Ok((StatusCode::OK, Json(agents)).into_response())
    }

    async fn register(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Json(mut agent): Json<Agent>,
    ) -> AppResult<Response> {
        agent.registered_by = Some(caller.username);
        let created = state.agents.register(agent, state.repositories.scans.as_ref()).await?;
        Ok((StatusCode::CREATED, Json(created)).into_response())
    }

    async fn get_one(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Path(path): Path<String>,
    ) -> AppResult<Response> {
        let resolver = state.scope_resolver.read().await;
        let agent = state.agents.get_for_caller(&normalize(&path), &caller, &resolver).await?;
        Ok((StatusCode::OK, Json(agent)).into_response())
    }

    async fn update(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
        Json(mut agent): Json<Agent>,
    ) -> AppResult<Response> {
        agent.path = normalize(&path);
        let updated = state.agents.update(agent).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn delete(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
    ) -> AppResult<Response> {
        state.agents.delete(&normalize(&path)).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn toggle(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
        Json(body): Json<ToggleRequest>,
    ) -> AppResult<Response> {
        state.agents.set_enabled(&normalize(&path), body.enabled).await?;
        Ok(StatusCode::OK.into_response())
    }

    async fn rate(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Path(path): Path<String>,
        Json(body): Json<RateRequest>,
    ) -> AppResult<Response> {
        let updated = state.agents.rate(&normalize(&path), &caller.username, body.rating).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
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

fn normalize(raw: &str) -> String {
    format!("/{}", raw.trim_start_matches('/'))
}
