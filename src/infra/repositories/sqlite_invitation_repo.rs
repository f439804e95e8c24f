use crate::domain::{models::invitation::Invitation, ports::InvitationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteInvitationRepo {
    pool: SqlitePool,
}

impl SqliteInvitationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for SqliteInvitationRepo {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
        sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations (token, event_id, owner_id, email, consumed_at, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&invitation.token)
            .bind(&invitation.event_id)
            .bind(&invitation.owner_id)
            .bind(&invitation.email)
            .bind(invitation.consumed_at)
            .bind(invitation.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, owner_id: &str, event_id: &str) -> Result<Vec<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE owner_id = ? AND event_id = ? ORDER BY created_at DESC",
        )
            .bind(owner_id)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_consumed(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        // Conditional update is the claim: only one caller can flip
        // consumed_at from NULL.
        let result = sqlx::query(
            "UPDATE invitations SET consumed_at = ? WHERE token = ? AND consumed_at IS NULL",
        )
            .bind(at)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Invitation already used".into()));
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM invitations WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
