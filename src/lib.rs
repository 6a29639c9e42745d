// Estia marketplace backend library

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::app_config::config;

/// CORS policy. Locked to the configured frontend origin when one is set,
/// otherwise open for local development.
pub fn cors_layer() -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE];

    match config()
        .frontend_url
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers),
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            "down"
        },
    };

    Json(json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
    }))
}

/// Assemble the full application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", handlers::auth_routes(state.clone()))
        .nest("/properties", handlers::property_routes(state.clone()))
        .nest("/buyer", handlers::buyer_routes(state.clone()))
        .nest("/buyer-agent", handlers::buyer_agent_routes(state.clone()))
        .nest("/seller", handlers::seller_routes(state.clone()))
        .nest("/agent", handlers::agent_routes(state.clone()))
        .nest(
            "/admin/transactions",
            handlers::admin_transaction_routes(state.clone()),
        )
        .nest(
            "/viewing-requests",
            handlers::viewing_request_routes(state.clone()),
        )
        .nest(
            "/notifications",
            handlers::notification_routes(state.clone()),
        )
        .nest("/support", handlers::support_routes(state.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
