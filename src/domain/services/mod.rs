pub mod aggregator;
pub mod invitation_service;
pub mod registration_service;
