use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub event_type: String,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateAttendeeRequest {
    pub name: String,
    pub email: String,
    pub attended: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateAttendeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub attended: Option<bool>,
}

#[derive(Deserialize)]
pub struct IssueInvitationRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub token: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}
