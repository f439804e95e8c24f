use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub date: NaiveDate,
    /// Wall-clock start time, "HH:MM".
    pub time: String,
    pub location: String,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        owner_id: String,
        name: String,
        date: NaiveDate,
        time: String,
        location: String,
        event_type: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            name,
            date,
            time,
            location,
            event_type,
            created_at: Utc::now(),
        }
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }
}
