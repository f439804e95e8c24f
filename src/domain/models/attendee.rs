use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Attendee {
    pub id: String,
    pub owner_id: String,
    pub event_id: String,
    pub name: String,
    pub email: String,
    pub attended: bool,
    pub created_at: DateTime<Utc>,
}

impl Attendee {
    pub fn new(
        owner_id: String,
        event_id: String,
        name: String,
        email: String,
        attended: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            event_id,
            name,
            email,
            attended,
            created_at: Utc::now(),
        }
    }
}
