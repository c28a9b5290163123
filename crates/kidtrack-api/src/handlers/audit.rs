//! Audit log query handler.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::AuditQuery;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/audit — search recorded audit events.
pub async fn search_audit(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filters): Query<AuditQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state
        .audit_repo
        .search(
            filters.actor_id,
            filters.action.as_deref(),
            &pagination.into_page_request(),
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": page })))
}
