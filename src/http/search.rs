// ABOUTME: `/api/search/semantic` route handler

use crate::http::auth::AuthenticatedCaller;
use crate::http::state::AppState;
use crate::models::SearchQuery;
use crate::services::scope_resolver::technical_name;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use registry_core::AppResult;

pub struct SearchRoutes;

impl SearchRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new().route("/api/search/semantic", post(Self::query)).with_state(state)
    }

    /// Runs the hybrid query, then filters results to what the caller may see
    ///.
    async fn query(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
        Json(query): Json<SearchQuery>,
    ) -> AppResult<Response> {
        let mut results = state.search_engine.query(&query).await?;
        let resolver = state.scope_resolver.read().await;

        results.servers.retain(|item| resolver.can_access_server(&caller, &item.path, &technical_name(&item.path)));
        results
            .tools
            .retain(|item| resolver.can_access_server(&caller, &item.server_path, &technical_name(&item.server_path)));

        let visible_agents: std::collections::BTreeSet<String> = state
            .agents
            .list_for_caller(&caller, &resolver)
            .await?
            .into_iter()
            .map(|a| a.path)
            .collect();
        results.agents.retain(|item| visible_agents.contains(&item.path));

        Ok((StatusCode::OK, Json(results)).into_response())
    }
}
