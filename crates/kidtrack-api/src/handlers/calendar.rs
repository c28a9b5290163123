//! Unified calendar handler.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::CalendarQuery;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/calendar — own + shared schedule, merged and date-sorted.
pub async fn unified_calendar(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state
        .calendar_service
        .unified_schedule(&auth, query.from, query.to)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": entries })))
}
