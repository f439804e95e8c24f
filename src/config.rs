use std::env;

/// Whether an invitation token may be resolved more than once. The
/// original product never marked tokens consumed; single-use is the
/// default here and multi-use must be opted into explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvitePolicy {
    SingleUse,
    MultiUse,
}

impl InvitePolicy {
    fn parse(raw: &str) -> Self {
        match raw {
            "multi-use" => InvitePolicy::MultiUse,
            _ => InvitePolicy::SingleUse,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_relay_url: String,
    pub mail_relay_token: String,
    /// Base URL the deep links embed, e.g. the frontend origin.
    pub public_base_url: String,
    /// Ed25519 public key (PEM) of the identity provider.
    pub auth_public_key: String,
    pub auth_audience: String,
    pub invite_policy: InvitePolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_relay_url: env::var("MAIL_RELAY_URL").unwrap_or_else(|_| "http://localhost:8000/send-invite".to_string()),
            mail_relay_token: env::var("MAIL_RELAY_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            auth_public_key: env::var("AUTH_PUBLIC_KEY").expect("AUTH_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "eventhub-frontend".to_string()),
            invite_policy: InvitePolicy::parse(
                &env::var("INVITE_POLICY").unwrap_or_else(|_| "single-use".to_string()),
            ),
        }
    }
}
