use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::event::Event;

#[derive(Serialize)]
pub struct InvitationIssuedResponse {
    pub token: String,
    pub link: String,
    pub email: Option<String>,
    pub event_id: String,
}

/// What an invitee sees before filling in the registration form.
#[derive(Serialize)]
pub struct ResolvedInvitationResponse {
    pub event: Event,
    /// Email the invitation was addressed to, for form prefill.
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub event_id: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct EventAttendance {
    pub event_id: String,
    pub name: String,
    pub total: usize,
    pub checked_in: usize,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub total_events: usize,
    pub total_attendees: usize,
    pub checked_in_attendees: usize,
    /// Percentage, one decimal place.
    pub attendance_rate: f64,
    pub attendance_by_event: Vec<EventAttendance>,
    pub event_type_counts: HashMap<String, usize>,
}
