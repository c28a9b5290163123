//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use kidtrack_core::config::AppConfig;
use kidtrack_database::connection::DatabasePool;
use kidtrack_database::repositories::audit::AuditLogRepository;
use kidtrack_service::calendar::CalendarService;
use kidtrack_service::invitation::InvitationService;
use kidtrack_service::sharing::SharingService;

use crate::auth::JwtDecoder;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (for health checks).
    pub db: DatabasePool,
    /// Access-token decoder.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Sharing engine.
    pub sharing_service: Arc<SharingService>,
    /// Invitation workflow.
    pub invitation_service: Arc<InvitationService>,
    /// Calendar projection.
    pub calendar_service: Arc<CalendarService>,
    /// Audit log queries.
    pub audit_repo: Arc<AuditLogRepository>,
}
