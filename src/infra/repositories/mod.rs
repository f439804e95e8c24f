pub mod postgres_attendee_repo;
pub mod postgres_event_repo;
pub mod postgres_invitation_repo;
pub mod postgres_registration_repo;
pub mod sqlite_attendee_repo;
pub mod sqlite_event_repo;
pub mod sqlite_invitation_repo;
pub mod sqlite_registration_repo;
