//! Child repository implementation (read-only to the sharing core).

use async_trait::async_trait;
use sqlx::PgPool;

use kidtrack_core::error::{AppError, ErrorKind};
use kidtrack_core::result::AppResult;
use kidtrack_core::types::id::{ChildId, UserId};
use kidtrack_entity::child::Child;

use crate::store::ChildStore;

/// Repository for child profile lookups.
#[derive(Debug, Clone)]
pub struct ChildRepository {
    pool: PgPool,
}

impl ChildRepository {
    /// Create a new child repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChildStore for ChildRepository {
    async fn find_by_id(&self, id: ChildId) -> AppResult<Option<Child>> {
        sqlx::query_as::<_, Child>("SELECT * FROM children WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find child", e))
    }

    async fn find_by_ids(&self, ids: &[ChildId]) -> AppResult<Vec<Child>> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, Child>("SELECT * FROM children WHERE id = ANY($1)")
            .bind(&uuids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find children", e))
    }

    async fn find_active_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Child>> {
        sqlx::query_as::<_, Child>(
            "SELECT * FROM children WHERE owner_id = $1 AND is_active = TRUE ORDER BY name",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }
}
