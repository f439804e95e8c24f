use serde::{Deserialize, Serialize};
use crate::domain::models::{attendee::Attendee, event::Event, registration::Registration};

/// A change notification fanned out on the broadcast bus after a
/// successful store write. Aggregators filter by `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ChangeEvent {
    EventCreated(Event),
    EventUpdated(Event),
    EventDeleted { owner_id: String, event_id: String },
    AttendeeCreated(Attendee),
    AttendeeUpdated(Attendee),
    AttendeeDeleted { owner_id: String, attendee_id: String },
    RegistrationCreated(Registration),
}

impl ChangeEvent {
    pub fn owner_id(&self) -> &str {
        match self {
            ChangeEvent::EventCreated(e) | ChangeEvent::EventUpdated(e) => &e.owner_id,
            ChangeEvent::EventDeleted { owner_id, .. } => owner_id,
            ChangeEvent::AttendeeCreated(a) | ChangeEvent::AttendeeUpdated(a) => &a.owner_id,
            ChangeEvent::AttendeeDeleted { owner_id, .. } => owner_id,
            ChangeEvent::RegistrationCreated(r) => &r.owner_id,
        }
    }
}
