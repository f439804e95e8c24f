use std::sync::Arc;

use tracing::{error, info};

use crate::domain::models::invitation::Invitation;
use crate::domain::ports::{EventRepository, InvitationRepository, MailService};
use crate::error::AppError;

#[derive(Debug)]
pub struct IssuedInvitation {
    pub invitation: Invitation,
    pub link: String,
}

/// Issues invitation tokens and hands delivery off to the mail relay.
/// Issuance is atomic with delivery: a failed send deletes the
/// just-created invitation so no orphaned token survives.
pub struct InvitationService {
    event_repo: Arc<dyn EventRepository>,
    invitation_repo: Arc<dyn InvitationRepository>,
    mail_service: Arc<dyn MailService>,
    public_base_url: String,
}

impl InvitationService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        invitation_repo: Arc<dyn InvitationRepository>,
        mail_service: Arc<dyn MailService>,
        public_base_url: String,
    ) -> Self {
        Self {
            event_repo,
            invitation_repo,
            mail_service,
            public_base_url,
        }
    }

    pub fn registration_link(&self, token: &str) -> String {
        format!("{}/event-register?token={}", self.public_base_url, token)
    }

    /// Issue an invitation and email the registration link.
    pub async fn issue(
        &self,
        owner_id: &str,
        event_id: &str,
        email: &str,
    ) -> Result<IssuedInvitation, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".into()));
        }

        let event = self
            .event_repo
            .find_by_id(owner_id, event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let invitation = Invitation::new(
            owner_id.to_string(),
            event.id.clone(),
            Some(email.to_string()),
        );
        let created = self.invitation_repo.create(&invitation).await?;
        let link = self.registration_link(&created.token);

        if let Err(e) = self
            .mail_service
            .send_invite(email, &event.id, &created.token)
            .await
        {
            // Compensating delete keeps issuance atomic with delivery.
            // A failed delete must not mask the delivery error.
            error!(
                "Invite delivery to {} failed, rolling back token: {}",
                email, e
            );
            if let Err(delete_err) = self.invitation_repo.delete(&created.token).await {
                error!(
                    "Rollback of invitation {} failed: {}",
                    created.token, delete_err
                );
            }
            return Err(AppError::NotificationDelivery(format!(
                "Could not deliver invitation to {}",
                email
            )));
        }

        info!("Invitation issued for event {} to {}", event.id, email);
        Ok(IssuedInvitation {
            invitation: created,
            link,
        })
    }

    /// Issue a shareable link without sending mail (the QR/share flow).
    /// The persisted record is read back before the link is returned.
    pub async fn issue_link(
        &self,
        owner_id: &str,
        event_id: &str,
    ) -> Result<IssuedInvitation, AppError> {
        let event = self
            .event_repo
            .find_by_id(owner_id, event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let invitation = Invitation::new(owner_id.to_string(), event.id.clone(), None);
        let created = self.invitation_repo.create(&invitation).await?;

        let verified = self
            .invitation_repo
            .find_by_token(&created.token)
            .await?
            .ok_or(AppError::InternalWithMsg(
                "Failed to verify invitation creation".into(),
            ))?;

        let link = self.registration_link(&verified.token);
        info!("Invitation link generated for event {}", event.id);
        Ok(IssuedInvitation {
            invitation: verified,
            link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::event::Event;
    use crate::domain::ports::MailService;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    struct OneEvent(Event);

    #[async_trait]
    impl EventRepository for OneEvent {
        async fn create(&self, event: &Event) -> Result<Event, AppError> {
            Ok(event.clone())
        }
        async fn find_by_id(&self, _: &str, _: &str) -> Result<Option<Event>, AppError> {
            Ok(Some(self.0.clone()))
        }
        async fn find_by_id_any_owner(&self, _: &str) -> Result<Option<Event>, AppError> {
            Ok(Some(self.0.clone()))
        }
        async fn list(&self, _: &str) -> Result<Vec<Event>, AppError> {
            Ok(vec![self.0.clone()])
        }
        async fn update(&self, event: &Event) -> Result<Event, AppError> {
            Ok(event.clone())
        }
        async fn delete(&self, _: &str, _: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    struct BrokenDeleteInvitations;

    #[async_trait]
    impl InvitationRepository for BrokenDeleteInvitations {
        async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
            Ok(invitation.clone())
        }
        async fn find_by_token(&self, _: &str) -> Result<Option<Invitation>, AppError> {
            Ok(None)
        }
        async fn list_by_event(&self, _: &str, _: &str) -> Result<Vec<Invitation>, AppError> {
            Ok(vec![])
        }
        async fn mark_consumed(&self, _: &str, _: DateTime<Utc>) -> Result<(), AppError> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> Result<(), AppError> {
            Err(AppError::Internal)
        }
    }

    struct UndeliverableMail;

    #[async_trait]
    impl MailService for UndeliverableMail {
        async fn send_invite(&self, _: &str, _: &str, _: &str) -> Result<(), AppError> {
            Err(AppError::NotificationDelivery("relay unreachable".into()))
        }
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_even_when_rollback_fails() {
        let event = Event::new(
            "owner-1".to_string(),
            "Gala".to_string(),
            Utc::now().date_naive(),
            "18:00".to_string(),
            "Hall A".to_string(),
            "conference".to_string(),
        );
        let service = InvitationService::new(
            Arc::new(OneEvent(event.clone())),
            Arc::new(BrokenDeleteInvitations),
            Arc::new(UndeliverableMail),
            "http://localhost".to_string(),
        );

        let err = service
            .issue("owner-1", &event.id, "guest@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotificationDelivery(_)));
    }
}
