use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::IssueInvitationRequest;
use crate::api::dtos::responses::InvitationIssuedResponse;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn issue_invitation(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<IssueInvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state
        .invitation_service
        .issue(&user.user_id, &event_id, &payload.email)
        .await?;

    info!("Invitation sent to {} for event {}", payload.email, event_id);

    Ok(Json(InvitationIssuedResponse {
        token: issued.invitation.token,
        link: issued.link,
        email: issued.invitation.email,
        event_id: issued.invitation.event_id,
    }))
}

/// Shareable link without an email send (the QR/poster flow).
pub async fn create_invite_link(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state
        .invitation_service
        .issue_link(&user.user_id, &event_id)
        .await?;

    Ok(Json(InvitationIssuedResponse {
        token: issued.invitation.token,
        link: issued.link,
        email: None,
        event_id: issued.invitation.event_id,
    }))
}

pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&user.user_id, &event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let invitations = state
        .invitation_repo
        .list_by_event(&user.user_id, &event.id)
        .await?;
    Ok(Json(invitations))
}
