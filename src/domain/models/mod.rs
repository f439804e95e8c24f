pub mod auth;
pub mod attendee;
pub mod change;
pub mod event;
pub mod invitation;
pub mod registration;
pub mod view;
