use crate::domain::models::{
    attendee::Attendee, event::Event, invitation::Invitation, registration::Registration,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, owner_id: &str, id: &str) -> Result<Option<Event>, AppError>;
    /// Anonymous lookup used by the token registration flow only.
    async fn find_by_id_any_owner(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self, owner_id: &str) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    async fn create(&self, attendee: &Attendee) -> Result<Attendee, AppError>;
    async fn find_by_id(&self, owner_id: &str, id: &str) -> Result<Option<Attendee>, AppError>;
    async fn list(&self, owner_id: &str) -> Result<Vec<Attendee>, AppError>;
    async fn list_by_event(&self, owner_id: &str, event_id: &str) -> Result<Vec<Attendee>, AppError>;
    async fn update(&self, attendee: &Attendee) -> Result<Attendee, AppError>;
    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError>;
    /// Anonymous lookup: invitations are resolved by token alone.
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError>;
    async fn list_by_event(&self, owner_id: &str, event_id: &str) -> Result<Vec<Invitation>, AppError>;
    /// Atomically claims an unconsumed token; `Conflict` when another
    /// claim got there first.
    async fn mark_consumed(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError>;
    async fn delete(&self, token: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError>;
    async fn list(&self, owner_id: &str) -> Result<Vec<Registration>, AppError>;
}

#[async_trait]
pub trait MailService: Send + Sync {
    /// Hands the invitation off to the outbound relay, which loads the
    /// event by id and renders the message itself.
    async fn send_invite(&self, email: &str, event_id: &str, token: &str) -> Result<(), AppError>;
}
