//! Audit log repository — the persisting implementation of the audit sink.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use kidtrack_core::error::{AppError, ErrorKind};
use kidtrack_core::events::DomainEvent;
use kidtrack_core::result::AppResult;
use kidtrack_core::traits::AuditSink;
use kidtrack_core::types::id::UserId;
use kidtrack_core::types::pagination::{PageRequest, PageResponse};
use kidtrack_entity::audit::AuditLogEntry;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Search audit log entries, optionally filtered by actor and action.
    pub async fn search(
        &self,
        actor_id: Option<Uuid>,
        action: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log \
             WHERE ($1::UUID IS NULL OR actor_id = $1) \
             AND ($2::TEXT IS NULL OR action = $2)",
        )
        .bind(actor_id)
        .bind(action)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log \
             WHERE ($1::UUID IS NULL OR actor_id = $1) \
             AND ($2::TEXT IS NULL OR action = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(actor_id)
        .bind(action)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
        })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn record(&self, actor_id: UserId, event: &DomainEvent) -> AppResult<()> {
        let details = serde_json::to_value(event)?;

        sqlx::query(
            "INSERT INTO audit_log (actor_id, action, target_type, target_id, details) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(actor_id)
        .bind(event.action())
        .bind(event.target_type())
        .bind(event.target_id())
        .bind(details)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record audit entry", e)
        })?;

        Ok(())
    }
}
