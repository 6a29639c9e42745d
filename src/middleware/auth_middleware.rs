// Authentication middleware for protected routes
// Validates JWT tokens and injects AuthenticatedUser into request extensions

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::utils::messages;

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn user_from_token(state: &AppState, token: &str) -> Option<AuthenticatedUser> {
    let claims = state.jwt_service.validate_token(token).ok()?;
    let user_id = Uuid::parse_str(&claims.sub).ok()?;

    Some(AuthenticatedUser {
        user_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Rejects requests without a valid Bearer token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(t) => t,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": messages::TOKEN_MISSING })),
            )
                .into_response();
        },
    };

    match user_from_token(&state, token) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        },
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": messages::TOKEN_INVALID })),
        )
            .into_response(),
    }
}

/// Attaches AuthenticatedUser when a valid token is present, but lets
/// anonymous requests through. Used by routes whose response shape depends
/// on who is asking, like the unavailable-listing visibility rule.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        if let Some(user) = user_from_token(&state, token) {
            request.extensions_mut().insert(user);
        }
    }

    next.run(request).await
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": messages::UNAUTHORIZED })),
                )
            })
    }
}

/// Extractor for routes served with optional authentication
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}
