pub mod attendee;
pub mod dashboard;
pub mod event;
pub mod health;
pub mod invitation;
pub mod registration;
pub mod report;
