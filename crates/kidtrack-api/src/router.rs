//! Route definitions for the KidTrack HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(share_routes())
        .merge(invitation_routes())
        .merge(calendar_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Share configuration, projection, and per-child permissions.
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares", get(handlers::share::list_shares))
        .route("/shares", post(handlers::share::configure_share))
        .route("/shares/{id}", put(handlers::share::update_share))
        .route("/shares/{id}/children", post(handlers::share::add_child))
        .route(
            "/shares/{id}/children/{child_id}",
            put(handlers::share::update_child_permissions),
        )
        .route(
            "/shares/{id}/children/{child_id}",
            delete(handlers::share::remove_child),
        )
        .route("/shared-children", get(handlers::share::shared_children))
        .route(
            "/children/{id}/access",
            get(handlers::share::check_child_access),
        )
}

/// Invitation workflow.
fn invitation_routes() -> Router<AppState> {
    Router::new()
        .route("/invitations", post(handlers::invitation::create_invitation))
        .route("/invitations", get(handlers::invitation::list_sent))
        .route(
            "/invitations/received",
            get(handlers::invitation::list_received),
        )
        .route(
            "/invitations/accept",
            post(handlers::invitation::accept_invitation),
        )
        .route(
            "/invitations/decline",
            post(handlers::invitation::decline_invitation),
        )
        .route(
            "/invitations/{id}",
            delete(handlers::invitation::cancel_invitation),
        )
}

/// Unified calendar.
fn calendar_routes() -> Router<AppState> {
    Router::new().route("/calendar", get(handlers::calendar::unified_calendar))
}

/// Admin endpoints.
fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/audit", get(handlers::audit::search_audit))
}

/// Health check endpoints (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use axum::http::{HeaderValue, Method};
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new().allow_headers(Any);

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
