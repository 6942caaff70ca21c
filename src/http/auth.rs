// ABOUTME: Bearer-token authentication extractor — decodes the caller-context claims
// ABOUTME: Issuance (JWT/session/reverse-proxy headers) is an external adapter concern; the core only validates

use crate::http::state::AppState;
use crate::models::CallerContext;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use registry_core::{AppError, AppResult};
use serde::Deserialize;
use std::collections::BTreeSet;

/// JWT claims carrying the identity-provider-resolved permission shape:
/// `username`, `groups[]`, `scopes[]`, `accessible_servers[]`,
/// `accessible_agents[]`, `is_admin`.
#[derive(Debug, Deserialize)]
struct CallerClaims {
    #[serde(rename = "sub")]
    username: String,
    #[serde(default)]
    groups: BTreeSet<String>,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(default)]
    accessible_servers: BTreeSet<String>,
    #[serde(default)]
    accessible_agents: BTreeSet<String>,
    #[serde(default)]
    is_admin: bool,
}

impl From<CallerClaims> for CallerContext {
    fn from(claims: CallerClaims) -> Self {
        Self {
            username: claims.username,
            groups: claims.groups,
            scopes: claims.scopes,
            accessible_servers: claims.accessible_servers,
            accessible_agents: claims.accessible_agents,
            is_admin: claims.is_admin,
        }
    }
}

/// Extracts and validates the caller context from the `Authorization:
/// Bearer <jwt>` header. Endpoints exempt from authentication
/// (discovery, `/health`, `/.well-known/...`) do not use this extractor.
pub struct AuthenticatedCaller(pub CallerContext);

impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::unauthenticated("missing or malformed Authorization header"))?;
        let token = bearer.token();

        let key = DecodingKey::from_secret(state.config.auth_jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<CallerClaims>(token, &key, &validation)
            .map_err(|e| AppError::unauthenticated(format!("invalid bearer token: {e}")))?;

        Ok(Self(data.claims.into()))
    }
}

pub struct AuthRoutes;

impl AuthRoutes {
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new().route("/api/auth/me", get(Self::me)).with_state(state)
    }

    /// `GET /api/auth/me` — caller identity and effective permissions,
    /// including the UI-permission union across the caller's scopes,
    /// computed fresh for this request.
    async fn me(
        State(state): State<AppState>,
        AuthenticatedCaller(caller): AuthenticatedCaller,
    ) -> AppResult<Response> {
        let resolver = state.scope_resolver.read().await;
        let is_admin = caller.is_admin || resolver.caller_has_admin_scope(&caller.groups);
        let ui_permissions = resolver.ui_permissions_for_caller(&caller.groups);
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "username": caller.username,
                "groups": caller.groups,
                "scopes": caller.scopes,
                "accessible_servers": caller.accessible_servers,
                "accessible_agents": caller.accessible_agents,
                "is_admin": is_admin,
                "ui_permissions": ui_permissions,
            })),
        )
            .into_response())
    }
}

/// Request-id middleware fields attached to every span via `tracing::Span`.
/// Kept as a small helper so the tower-http layer and handlers agree on the
/// header name.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
