use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// `owner_id` is the partition key of the event owner, so the owner's
/// dashboards see registrations made against their invitations.
/// `registrant_id` records the resolving user when one was
/// authenticated.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Registration {
    pub ticket_id: String,
    pub event_id: String,
    pub owner_id: String,
    pub registrant_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        owner_id: String,
        event_id: String,
        registrant_id: Option<String>,
        name: String,
        email: String,
        phone: String,
        token: String,
    ) -> Self {
        Self {
            ticket_id: Uuid::new_v4().to_string(),
            event_id,
            owner_id,
            registrant_id,
            name,
            email,
            phone,
            token,
            created_at: Utc::now(),
        }
    }
}
