use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use crate::domain::models::auth::{Claims, Identity};
use crate::state::AppState;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;

/// Optional identity for the anonymous registration flow: a bad or
/// absent token is treated as a guest, never as an error.
pub struct MaybeAuthUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t.to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key =
            match DecodingKey::from_ed_pem(app_state.config.auth_public_key.as_bytes()) {
                Ok(key) => key,
                Err(_) => return Ok(MaybeAuthUser(None)),
            };

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[app_state.config.auth_audience.as_str()]);

        match decode::<Claims>(&token, &decoding_key, &validation) {
            Ok(data) => Ok(MaybeAuthUser(Some(Identity {
                user_id: data.claims.sub,
                email: data.claims.email,
            }))),
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}
