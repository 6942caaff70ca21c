// ABOUTME: `/.well-known/...` service discovery metadata — public, no auth

use crate::http::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

pub struct WellKnownRoutes;

impl WellKnownRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/.well-known/mcp-registry", get(Self::discovery))
            .with_state(state)
    }

    async fn discovery(State(state): State<AppState>) -> Response {
        let body = serde_json::json!({
            "service": "registry-gateway",
            "anthropic_registry_api": "/v0/servers",
            "search_endpoint": "/api/search/semantic",
            "storage_backend": format!("{:?}", state.config.storage_backend),
        });
        (StatusCode::OK, Json(body)).into_response()
    }
}
