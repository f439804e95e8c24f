use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// An invitation is keyed by its token. `consumed_at` is only ever set
/// when the single-use policy is active.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Invitation {
    pub token: String,
    pub event_id: String,
    pub owner_id: String,
    pub email: Option<String>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(owner_id: String, event_id: String, email: Option<String>) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        Self {
            token,
            event_id,
            owner_id,
            email,
            consumed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}
