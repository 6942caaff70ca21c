// ABOUTME: HTTP edge — router assembly, auth extraction, and per-route handler modules
// ABOUTME: Every module here is a thin translation layer over the services in `crate::services`

pub mod agents;
pub mod auth;
pub mod discovery;
pub mod federation;
pub mod health;
pub mod middleware;
pub mod search;
pub mod servers;
pub mod state;
pub mod well_known;

pub use state::AppState;

use axum::http::Method;
use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

/// Assemble the full router: public discovery/health/well-known routes plus
/// the bearer-authenticated API surface, with the ambient request-id,
/// tracing, CORS, and timeout layers applied uniformly.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.http_request_timeout_seconds);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION]);

    Router::new()
        .merge(health::HealthRoutes::routes(state.clone()))
        .merge(well_known::WellKnownRoutes::routes(state.clone()))
        .merge(discovery::DiscoveryRoutes::routes(state.clone()))
        .merge(auth::AuthRoutes::routes(state.clone()))
        .merge(servers::ServerRoutes::routes(state.clone()))
        .merge(agents::AgentRoutes::routes(state.clone()))
        .merge(search::SearchRoutes::routes(state.clone()))
        .merge(federation::FederationRoutes::routes(state))
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static(auth::REQUEST_ID_HEADER),
            middleware::RequestIdGenerator,
        ))
        .layer(middleware::trace_layer())
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static(
            auth::REQUEST_ID_HEADER,
        )))
        .layer(cors)
        .layer(TimeoutLayer::new(request_timeout))
}
