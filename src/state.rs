use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::domain::models::change::ChangeEvent;
use crate::domain::ports::{
    AttendeeRepository, EventRepository, InvitationRepository, MailService,
    RegistrationRepository,
};
use crate::domain::services::aggregator::LiveRegistry;
use crate::domain::services::invitation_service::InvitationService;
use crate::domain::services::registration_service::RegistrationService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_repo: Arc<dyn EventRepository>,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub invitation_repo: Arc<dyn InvitationRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub mail_service: Arc<dyn MailService>,
    pub invitation_service: Arc<InvitationService>,
    pub registration_service: Arc<RegistrationService>,
    pub changes: broadcast::Sender<ChangeEvent>,
    pub live: Arc<LiveRegistry>,
}

impl AppState {
    /// Fan a committed write out to every live aggregator. A send with
    /// no receivers just means nobody is watching.
    pub fn publish(&self, change: ChangeEvent) {
        let _ = self.changes.send(change);
    }
}
