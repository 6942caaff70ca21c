// ABOUTME: `GET /health` liveness and `GET /api/health/{path}` on-demand probe handlers

use crate::http::auth::AuthenticatedCaller;
use crate::http::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use registry_core::AppResult;
use serde::Serialize;

pub struct HealthRoutes;

impl HealthRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/health", get(Self::liveness))
            .route("/api/health/:path", get(Self::check_now))
            .with_state(state)
    }

    /// Unauthenticated liveness probe.
    async fn liveness() -> Response {
        (StatusCode::OK, Json(LivenessBody { status: "ok", service: "registry-gateway" })).into_response()
    }

    async fn check_now(
        State(state): State<AppState>,
        _caller: AuthenticatedCaller,
        Path(path): Path<String>,
    ) -> AppResult<Response> {
        let normalized = format!("/{}", path.trim_start_matches('/'));
        let cached = state.health_monitor.check_now(&normalized).await?;
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "path": normalized,
                "status": cached.status.as_str(),
                "checked_at": cached.checked_at,
                "consecutive_failures": cached.consecutive_failures,
            })),
        )
            .into_response())
    }
}

#[derive(Serialize)]
struct LivenessBody {
    status: &'static str,
    service: &'static str,
}
