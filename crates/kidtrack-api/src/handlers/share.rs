//! Share configuration, projection, and per-child permission handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use kidtrack_core::types::id::{ChildId, ShareId, UserId};
use kidtrack_entity::share::ChildPermissions;
use kidtrack_service::sharing::UpdateShareRequest;

use crate::dto::request::{
    ConfigureShareRequest, ShareChildRequest, SharedChildrenQuery, UpdateShareBody,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/shares — relationships the caller shares out, with profiles.
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let shares = state.sharing_service.get_user_shares(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": shares })))
}

/// POST /api/shares — create or reconfigure a share relationship.
///
/// The submitted child list replaces the relationship's entire profile set.
pub async fn configure_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ConfigureShareRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let share = state
        .sharing_service
        .configure_sharing(&auth, body.into_command())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": share })),
    ))
}

/// PUT /api/shares/{id} — update tier, expiry, or active flag.
pub async fn update_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateShareBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let share = state
        .sharing_service
        .update_share(
            &auth,
            ShareId::from_uuid(id),
            UpdateShareRequest {
                permission_level: body.permission_level,
                expires_at: body.expires_at,
                is_active: body.is_active,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": share })))
}

/// GET /api/shared-children — the caller's filtered view of children
/// shared with them.
pub async fn shared_children(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SharedChildrenQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let views = state
        .sharing_service
        .get_shared_children(&auth, query.sharing_user_id.map(UserId::from_uuid))
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": views })))
}

/// POST /api/shares/{id}/children — add one child to a share.
pub async fn add_child(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ShareChildRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let profile = state
        .sharing_service
        .add_child_to_share(&auth, ShareId::from_uuid(id), body.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": profile })),
    ))
}

/// PUT /api/shares/{id}/children/{child_id} — replace one child's flags.
pub async fn update_child_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
    Json(permissions): Json<ChildPermissions>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = state
        .sharing_service
        .update_child_permissions(
            &auth,
            ShareId::from_uuid(id),
            ChildId::from_uuid(child_id),
            permissions,
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": profile })))
}

/// DELETE /api/shares/{id}/children/{child_id} — remove one child.
pub async fn remove_child(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .sharing_service
        .remove_child_from_share(&auth, ShareId::from_uuid(id), ChildId::from_uuid(child_id))
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "message": "Child removed from share" }
    })))
}

/// GET /api/children/{id}/access — fast authorization probe used by
/// collaborator screens before rendering a child they do not own.
pub async fn check_child_access(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(child_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let allowed = state
        .sharing_service
        .has_access_to_child(auth.user_id, ChildId::from_uuid(child_id))
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "allowed": allowed }
    })))
}
