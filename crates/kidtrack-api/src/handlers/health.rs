//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/health/detailed
pub async fn detailed_health(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let database = state.db.health_check().await.unwrap_or(false);

    Ok(Json(serde_json::json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
