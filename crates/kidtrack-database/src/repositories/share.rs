//! Share relationship repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kidtrack_core::error::{AppError, ErrorKind};
use kidtrack_core::result::AppResult;
use kidtrack_core::types::id::{ChildId, ShareId, UserId};
use kidtrack_entity::share::{
    ActivityShareProfile, ChildPermissions, ProfileSpec, ShareConfiguration, ShareRelationship,
};

use crate::store::ShareStore;

/// Repository for share relationships and their permission profiles.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareRelationship>> {
        sqlx::query_as::<_, ShareRelationship>("SELECT * FROM share_relationships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    async fn find_by_pair(
        &self,
        sharing_user_id: UserId,
        shared_with_user_id: UserId,
    ) -> AppResult<Option<ShareRelationship>> {
        sqlx::query_as::<_, ShareRelationship>(
            "SELECT * FROM share_relationships \
             WHERE sharing_user_id = $1 AND shared_with_user_id = $2",
        )
        .bind(sharing_user_id)
        .bind(shared_with_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find share by pair", e)
        })
    }

    async fn find_by_sharing_user(
        &self,
        sharing_user_id: UserId,
    ) -> AppResult<Vec<ShareRelationship>> {
        sqlx::query_as::<_, ShareRelationship>(
            "SELECT * FROM share_relationships \
             WHERE sharing_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(sharing_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))
    }

    async fn find_active_for_viewer(
        &self,
        viewer_id: UserId,
        sharing_user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ShareRelationship>> {
        sqlx::query_as::<_, ShareRelationship>(
            "SELECT * FROM share_relationships \
             WHERE shared_with_user_id = $1 \
             AND is_active = TRUE \
             AND (expires_at IS NULL OR expires_at > $2) \
             AND ($3::UUID IS NULL OR sharing_user_id = $3) \
             ORDER BY created_at DESC",
        )
        .bind(viewer_id)
        .bind(now)
        .bind(sharing_user_id.map(UserId::into_uuid))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list shares for viewer", e)
        })
    }

    async fn apply_configuration(
        &self,
        config: &ShareConfiguration,
    ) -> AppResult<ShareRelationship> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Concurrent configurations for the same pair serialize on the
        // pair's unique constraint; the loser's ON CONFLICT path turns into
        // an update rather than a duplicate-key failure.
        let share = sqlx::query_as::<_, ShareRelationship>(
            "INSERT INTO share_relationships \
             (sharing_user_id, shared_with_user_id, permission_level, expires_at, is_active) \
             VALUES ($1, $2, $3, $4, TRUE) \
             ON CONFLICT (sharing_user_id, shared_with_user_id) DO UPDATE SET \
             permission_level = EXCLUDED.permission_level, \
             expires_at = EXCLUDED.expires_at, \
             is_active = TRUE, \
             updated_at = NOW() \
             RETURNING *",
        )
        .bind(config.sharing_user_id)
        .bind(config.shared_with_user_id)
        .bind(config.permission_level)
        .bind(config.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert share", e))?;

        // Full replace: delete-all then insert-all inside the same
        // transaction, so a crash can never leave a half-written set.
        sqlx::query("DELETE FROM activity_share_profiles WHERE share_id = $1")
            .bind(share.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear profiles", e)
            })?;

        for spec in &config.profiles {
            sqlx::query(
                "INSERT INTO activity_share_profiles \
                 (share_id, child_id, can_view_interested, can_view_registered, \
                 can_view_completed, can_view_notes) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(share.id)
            .bind(spec.child_id)
            .bind(spec.permissions.can_view_interested)
            .bind(spec.permissions.can_view_registered)
            .bind(spec.permissions.can_view_completed)
            .bind(spec.permissions.can_view_notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert profile", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit configuration", e)
        })?;

        Ok(share)
    }

    async fn update(&self, share: &ShareRelationship) -> AppResult<ShareRelationship> {
        sqlx::query_as::<_, ShareRelationship>(
            "UPDATE share_relationships SET \
             permission_level = $2, expires_at = $3, is_active = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(share.id)
        .bind(share.permission_level)
        .bind(share.expires_at)
        .bind(share.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update share", e))
    }

    async fn deactivate(&self, id: ShareId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE share_relationships SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate share", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE share_relationships SET is_active = FALSE, updated_at = NOW() \
             WHERE is_active = TRUE AND expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to deactivate expired shares", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn profiles_for_share(&self, share_id: ShareId) -> AppResult<Vec<ActivityShareProfile>> {
        sqlx::query_as::<_, ActivityShareProfile>(
            "SELECT * FROM activity_share_profiles WHERE share_id = $1 ORDER BY created_at",
        )
        .bind(share_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list profiles", e))
    }

    async fn find_profile(
        &self,
        share_id: ShareId,
        child_id: ChildId,
    ) -> AppResult<Option<ActivityShareProfile>> {
        sqlx::query_as::<_, ActivityShareProfile>(
            "SELECT * FROM activity_share_profiles WHERE share_id = $1 AND child_id = $2",
        )
        .bind(share_id)
        .bind(child_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find profile", e))
    }

    async fn insert_profile(
        &self,
        share_id: ShareId,
        spec: &ProfileSpec,
    ) -> AppResult<ActivityShareProfile> {
        sqlx::query_as::<_, ActivityShareProfile>(
            "INSERT INTO activity_share_profiles \
             (share_id, child_id, can_view_interested, can_view_registered, \
             can_view_completed, can_view_notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(share_id)
        .bind(spec.child_id)
        .bind(spec.permissions.can_view_interested)
        .bind(spec.permissions.can_view_registered)
        .bind(spec.permissions.can_view_completed)
        .bind(spec.permissions.can_view_notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert profile", e))
    }

    async fn update_profile(
        &self,
        share_id: ShareId,
        child_id: ChildId,
        permissions: &ChildPermissions,
    ) -> AppResult<Option<ActivityShareProfile>> {
        sqlx::query_as::<_, ActivityShareProfile>(
            "UPDATE activity_share_profiles SET \
             can_view_interested = $3, can_view_registered = $4, \
             can_view_completed = $5, can_view_notes = $6, updated_at = NOW() \
             WHERE share_id = $1 AND child_id = $2 RETURNING *",
        )
        .bind(share_id)
        .bind(child_id)
        .bind(permissions.can_view_interested)
        .bind(permissions.can_view_registered)
        .bind(permissions.can_view_completed)
        .bind(permissions.can_view_notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update profile", e))
    }

    async fn delete_profile(&self, share_id: ShareId, child_id: ChildId) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM activity_share_profiles WHERE share_id = $1 AND child_id = $2",
        )
        .bind(share_id)
        .bind(child_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete profile", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_profiles(&self, share_id: ShareId) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM activity_share_profiles WHERE share_id = $1")
                .bind(share_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count profiles", e)
                })?;
        Ok(count as u64)
    }

    async fn viewer_has_grant(
        &self,
        viewer_id: UserId,
        child_id: ChildId,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
             SELECT 1 FROM activity_share_profiles p \
             JOIN share_relationships s ON s.id = p.share_id \
             WHERE s.shared_with_user_id = $1 AND p.child_id = $2 \
             AND s.is_active = TRUE \
             AND (s.expires_at IS NULL OR s.expires_at > $3))",
        )
        .bind(viewer_id)
        .bind(child_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check grant", e))
    }
}
