use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::RegisterRequest;
use crate::api::dtos::responses::{ResolvedInvitationResponse, TicketResponse};
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::domain::models::change::ChangeEvent;
use crate::domain::services::registration_service::RegistrationDetails;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Anonymous: invitees hit this from the emailed deep link.
pub async fn resolve_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (invitation, event) = state.registration_service.resolve(&token).await?;

    Ok(Json(ResolvedInvitationResponse {
        event,
        email: invitation.email,
    }))
}

/// Anonymous, but a valid bearer token records the registrant.
pub async fn register(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(identity): MaybeAuthUser,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let registrant_id = identity.map(|i| i.user_id);
    let registration = state
        .registration_service
        .register(
            &payload.token,
            RegistrationDetails {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
            },
            registrant_id,
        )
        .await?;

    info!(
        "Registration {} created for event {}",
        registration.ticket_id, registration.event_id
    );
    state.publish(ChangeEvent::RegistrationCreated(registration.clone()));

    Ok(Json(TicketResponse {
        ticket_id: registration.ticket_id,
        event_id: registration.event_id,
        name: registration.name,
        email: registration.email,
    }))
}

pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let registrations = state.registration_repo.list(&user.user_id).await?;
    Ok(Json(registrations))
}
