//! Invitation repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kidtrack_core::error::{AppError, ErrorKind};
use kidtrack_core::result::AppResult;
use kidtrack_core::types::id::{InvitationId, UserId};
use kidtrack_entity::invitation::{CreateInvitation, Invitation, InvitationStatus};
use kidtrack_entity::share::{PermissionLevel, ShareRelationship};

use crate::store::InvitationStore;

/// Repository for invitations and their acceptance transaction.
#[derive(Debug, Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Create a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationStore for InvitationRepository {
    async fn create(&self, data: &CreateInvitation) -> AppResult<Invitation> {
        sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations \
             (sender_id, recipient_email, recipient_user_id, token, message, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.sender_id)
        .bind(&data.recipient_email)
        .bind(data.recipient_user_id)
        .bind(&data.token)
        .bind(&data.message)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create invitation", e))
    }

    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find invitation", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find invitation by token", e)
            })
    }

    async fn find_pending(
        &self,
        sender_id: UserId,
        recipient_email: &str,
    ) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations \
             WHERE sender_id = $1 AND recipient_email = $2 AND status = 'pending'",
        )
        .bind(sender_id)
        .bind(recipient_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find pending invitation", e)
        })
    }

    async fn count_pending(&self, sender_id: UserId, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM invitations \
             WHERE sender_id = $1 AND status = 'pending' AND expires_at > $2",
        )
        .bind(sender_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count pending invitations", e)
        })?;
        Ok(count as u64)
    }

    async fn find_by_sender(&self, sender_id: UserId) -> AppResult<Vec<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE sender_id = $1 ORDER BY created_at DESC",
        )
        .bind(sender_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list sent invitations", e)
        })
    }

    async fn find_by_recipient_email(&self, email: &str) -> AppResult<Vec<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations \
             WHERE recipient_email = LOWER($1) ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list received invitations", e)
        })
    }

    async fn mark_expired(&self, id: InvitationId) -> AppResult<()> {
        sqlx::query(
            "UPDATE invitations SET status = 'expired', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to expire invitation", e)
        })?;
        Ok(())
    }

    async fn set_terminal_status(
        &self,
        id: InvitationId,
        status: InvitationStatus,
    ) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update invitation status", e)
        })
    }

    async fn accept(
        &self,
        id: InvitationId,
        recipient_user_id: UserId,
        default_level: PermissionLevel,
        now: DateTime<Utc>,
    ) -> AppResult<Option<(Invitation, ShareRelationship)>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let invitation = sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET \
             status = 'accepted', recipient_user_id = $2, accepted_at = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(recipient_user_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to accept invitation", e)
        })?;

        let Some(invitation) = invitation else {
            tx.rollback().await.ok();
            return Ok(None);
        };

        // Reactivation must leave an existing relationship's permission
        // configuration untouched; only a brand-new row gets the default
        // tier, and acceptance alone never creates profiles.
        let share = sqlx::query_as::<_, ShareRelationship>(
            "INSERT INTO share_relationships \
             (sharing_user_id, shared_with_user_id, permission_level, is_active) \
             VALUES ($1, $2, $3, TRUE) \
             ON CONFLICT (sharing_user_id, shared_with_user_id) DO UPDATE SET \
             is_active = TRUE, updated_at = NOW() \
             RETURNING *",
        )
        .bind(invitation.sender_id)
        .bind(recipient_user_id)
        .bind(default_level)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to provision share", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit acceptance", e)
        })?;

        Ok(Some((invitation, share)))
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE invitations SET status = 'expired', updated_at = NOW() \
             WHERE status = 'pending' AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to expire overdue invitations", e)
        })?;
        Ok(result.rows_affected())
    }
}
