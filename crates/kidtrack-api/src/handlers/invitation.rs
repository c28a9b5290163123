//! Invitation workflow handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use kidtrack_core::error::AppError;
use kidtrack_core::types::id::InvitationId;
use kidtrack_service::invitation::CreateInvitationRequest;

use crate::dto::request::{CreateInvitationBody, InvitationTokenBody};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateInvitationBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let invitation = state
        .invitation_service
        .create_invitation(
            &auth,
            CreateInvitationRequest {
                recipient_email: body.recipient_email,
                message: body.message,
                expires_in_days: body.expires_in_days,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": invitation })),
    ))
}

/// GET /api/invitations — invitations the caller has sent.
pub async fn list_sent(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitations = state.invitation_service.list_sent(&auth).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": invitations }),
    ))
}

/// GET /api/invitations/received — invitations addressed to the caller.
pub async fn list_received(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitations = state.invitation_service.list_received(&auth).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": invitations }),
    ))
}

/// POST /api/invitations/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<InvitationTokenBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let acceptance = state
        .invitation_service
        .accept_invitation(&auth, &body.token)
        .await?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": acceptance }),
    ))
}

/// POST /api/invitations/decline
pub async fn decline_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<InvitationTokenBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitation = state
        .invitation_service
        .decline_invitation(&auth, &body.token)
        .await?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": invitation }),
    ))
}

/// DELETE /api/invitations/{id} — sender withdraws a pending invitation.
pub async fn cancel_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitation = state
        .invitation_service
        .cancel_invitation(&auth, InvitationId::from_uuid(id))
        .await?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": invitation }),
    ))
}
