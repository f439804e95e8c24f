use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    EventAdded,
    AttendeeAdded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrantSource {
    Registration,
    Attendee,
}

/// One row of the merged registrant view. Attendee and registration
/// records sharing an email collapse to a single entry; the
/// registration record takes precedence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registrant {
    pub event_id: String,
    pub name: String,
    pub email: String,
    pub source: RegistrantSource,
    pub ticket_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardView {
    pub total_events: usize,
    pub checked_in_attendees: usize,
    pub upcoming_events: usize,
    pub recent_activity: Vec<ActivityEntry>,
    pub registrants: Vec<Registrant>,
}
