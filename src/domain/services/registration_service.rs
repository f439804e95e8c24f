use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::InvitePolicy;
use crate::domain::models::{event::Event, invitation::Invitation, registration::Registration};
use crate::domain::ports::{EventRepository, InvitationRepository, RegistrationRepository};
use crate::error::AppError;

pub struct RegistrationDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Resolves invitation tokens and records registrations. The token
/// lookup is the one deliberately unpartitioned query in the system.
pub struct RegistrationService {
    event_repo: Arc<dyn EventRepository>,
    invitation_repo: Arc<dyn InvitationRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
    policy: InvitePolicy,
}

impl RegistrationService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        invitation_repo: Arc<dyn InvitationRepository>,
        registration_repo: Arc<dyn RegistrationRepository>,
        policy: InvitePolicy,
    ) -> Self {
        Self {
            event_repo,
            invitation_repo,
            registration_repo,
            policy,
        }
    }

    /// Token -> (invitation, event), rejecting consumed tokens under
    /// the single-use policy.
    pub async fn resolve(&self, token: &str) -> Result<(Invitation, Event), AppError> {
        if token.trim().is_empty() {
            return Err(AppError::Validation("Missing invitation token".into()));
        }

        let invitation = self
            .invitation_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::NotFound("Invalid invitation token".into()))?;

        if self.policy == InvitePolicy::SingleUse && invitation.is_consumed() {
            return Err(AppError::Conflict("Invitation already used".into()));
        }

        let event = self
            .event_repo
            .find_by_id_any_owner(&invitation.event_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Event not found for event ID: {}",
                    invitation.event_id
                ))
            })?;

        Ok((invitation, event))
    }

    /// Resolve a token and record the registration. The registration
    /// lands in the inviting owner's partition; `registrant_id` keeps
    /// the resolving user when one was authenticated. Any failure
    /// leaves the store without a registration.
    pub async fn register(
        &self,
        token: &str,
        details: RegistrationDetails,
        registrant_id: Option<String>,
    ) -> Result<Registration, AppError> {
        if details.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if details.email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".into()));
        }
        if details.phone.trim().is_empty() {
            return Err(AppError::Validation("Phone is required".into()));
        }

        let (invitation, event) = self.resolve(token).await?;

        // Claim the token before writing the registration. Concurrent
        // resolvers race on the conditional update; the loser gets
        // Conflict and writes nothing.
        if self.policy == InvitePolicy::SingleUse {
            self.invitation_repo
                .mark_consumed(&invitation.token, Utc::now())
                .await?;
        }

        let registration = Registration::new(
            invitation.owner_id.clone(),
            event.id.clone(),
            registrant_id,
            details.name,
            details.email,
            details.phone,
            invitation.token.clone(),
        );
        let created = self.registration_repo.create(&registration).await?;

        info!(
            "Registration {} recorded for event {}",
            created.ticket_id, event.id
        );
        Ok(created)
    }
}
