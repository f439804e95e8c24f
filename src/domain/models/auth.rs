use serde::{Deserialize, Serialize};

/// Claims of an identity-provider access token. The backend never
/// issues these; it only verifies them against the provider's public
/// key.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// The verified identity a request acts as. Every owner-scoped query
/// must be filtered by `user_id`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}
