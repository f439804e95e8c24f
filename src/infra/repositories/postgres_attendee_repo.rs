use crate::domain::{models::attendee::Attendee, ports::AttendeeRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAttendeeRepo {
    pool: PgPool,
}

impl PostgresAttendeeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendeeRepository for PostgresAttendeeRepo {
    async fn create(&self, attendee: &Attendee) -> Result<Attendee, AppError> {
        sqlx::query_as::<_, Attendee>(
            "INSERT INTO attendees (id, owner_id, event_id, name, email, attended, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
            .bind(&attendee.id)
            .bind(&attendee.owner_id)
            .bind(&attendee.event_id)
            .bind(&attendee.name)
            .bind(&attendee.email)
            .bind(attendee.attended)
            .bind(attendee.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, owner_id: &str, id: &str) -> Result<Option<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>("SELECT * FROM attendees WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(
            "SELECT * FROM attendees WHERE owner_id = $1 ORDER BY created_at",
        )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, owner_id: &str, event_id: &str) -> Result<Vec<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(
            "SELECT * FROM attendees WHERE owner_id = $1 AND event_id = $2 ORDER BY created_at",
        )
            .bind(owner_id)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, attendee: &Attendee) -> Result<Attendee, AppError> {
        sqlx::query_as::<_, Attendee>(
            "UPDATE attendees SET name=$1, email=$2, attended=$3, event_id=$4 WHERE id=$5 AND owner_id=$6 RETURNING *",
        )
            .bind(&attendee.name)
            .bind(&attendee.email)
            .bind(attendee.attended)
            .bind(&attendee.event_id)
            .bind(&attendee.id)
            .bind(&attendee.owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attendees WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Attendee not found".into()));
        }
        Ok(())
    }
}
