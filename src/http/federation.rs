// ABOUTME: `/api/federation` route handlers — config CRUD plus on-demand sync

use crate::http::auth::AuthenticatedCaller;
use crate::http::state::AppState;
use crate::models::FederationConfig;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use registry_core::{AppError, AppResult};
use serde::Deserialize;

pub struct FederationRoutes;

impl FederationRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/api/federation/config", get(Self::list).post(Self::create))
            .route("/api/federation/config/:id", get(Self::get_one).put(Self::update).delete(Self::delete))
            .route("/api/federation/sync", post(Self::sync))
            .with_state(state)
    }

    async fn list(State(state): State<AppState>, _caller: AuthenticatedCaller) -> AppResult<Response> {
        let configs = state.repositories.federation.list_all().await?;
        Ok((StatusCode::OK, Json(configs)).into_response())
    }

    async fn create(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Json(config): Json<FederationConfig>,
    ) -> AppResult<Response> {
        let created = state.repositories.federation.create(config).await?;
        Ok((StatusCode::CREATED, Json(created)).into_response())
    }

    async fn get_one(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let config = state
            .repositories
            .federation
            .get(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("federation config {id}")))?;
        Ok((StatusCode::OK, Json(config)).into_response())
    }

    async fn update(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(id): Path<String>,
        Json(mut config): Json<FederationConfig>,
    ) -> AppResult<Response> {
        config.id = id;
        let updated = state.repositories.federation.update(config).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn delete(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        state.repositories.federation.delete(&id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// `POST /api/federation/sync?source=<id>`; omitted `source` syncs every
    /// enabled upstream.
    async fn sync(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Query(params): Query<SyncQuery>,
    ) -> AppResult<Response> {
        let outcomes = match params.source {
            Some(id) => state.federation.sync_upstream(&id, &state.servers, &state.agents).await?,
            None => state.federation.sync_all(&state.servers, &state.agents).await?,
        };
        let body: Vec<_> = outcomes
            .into_iter()
            .map(|o| {
                serde_json::json!({
                    "upstream_name": o.upstream_name,
                    "ok": o.result.is_ok(),
                    "error": o.result.err(),
                })
            })
            .collect();
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}

#[derive(Debug, Deserialize)]
struct SyncQuery {
    source: Option<String>,
}
