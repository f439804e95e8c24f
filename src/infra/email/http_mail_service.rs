use std::time::Duration;

use crate::domain::ports::MailService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Client for the outbound invite relay. The relay loads the event by
/// id and renders the message itself; this side only posts the triple.
pub struct HttpMailService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpMailService {
    pub fn new(api_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            api_url,
            api_key,
        }
    }

    async fn post_invite(&self, payload: &InvitePayload<'_>) -> Result<(), String> {
        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Mail relay connection error: {}", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(format!("Mail relay failed. Status: {}, Body: {}", status, text));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct InvitePayload<'a> {
    email: &'a str,
    #[serde(rename = "eventId")]
    event_id: &'a str,
    token: &'a str,
}

#[async_trait]
impl MailService for HttpMailService {
    async fn send_invite(&self, email: &str, event_id: &str, token: &str) -> Result<(), AppError> {
        let payload = InvitePayload {
            email,
            event_id,
            token,
        };

        // One retry after a short delay covers transient relay hiccups;
        // anything beyond that is surfaced to the caller.
        match self.post_invite(&payload).await {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!("Invite send failed, retrying once: {}", first);
                sleep(RETRY_DELAY).await;
                self.post_invite(&payload).await.map_err(|second| {
                    error!("{}", second);
                    AppError::NotificationDelivery(second)
                })
            }
        }
    }
}
