use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{CreateAttendeeRequest, UpdateAttendeeRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{attendee::Attendee, change::ChangeEvent};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Create runs through the live aggregator's optimistic path: the
/// placeholder is visible the moment the request is accepted and is
/// swapped (or rolled back) once the store answers.
pub async fn create_attendee(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateAttendeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }

    let event = state
        .event_repo
        .find_by_id(&user.user_id, &event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let attendee = Attendee::new(
        user.user_id.clone(),
        event.id.clone(),
        payload.name.clone(),
        payload.email.clone(),
        payload.attended.unwrap_or(false),
    );

    // Stage the placeholder only when a live view is open; nobody is
    // watching otherwise and the task would linger.
    let guard = match state.live.existing(&user.user_id).await {
        Some(aggregator) => {
            let placeholder = Attendee::new(
                user.user_id.clone(),
                event.id,
                payload.name,
                payload.email,
                attendee.attended,
            );
            Some(aggregator.stage_attendee(placeholder))
        }
        None => None,
    };

    match state.attendee_repo.create(&attendee).await {
        Ok(created) => {
            if let Some(guard) = guard {
                guard.confirm(created.clone());
            }
            info!("Created attendee {} for event {}", created.id, event_id);
            state.publish(ChangeEvent::AttendeeCreated(created.clone()));
            Ok(Json(created))
        }
        // Dropping the guard rolls the placeholder back.
        Err(e) => Err(e),
    }
}

pub async fn list_attendees(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attendees = state
        .attendee_repo
        .list_by_event(&user.user_id, &event_id)
        .await?;
    Ok(Json(attendees))
}

pub async fn update_attendee(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(attendee_id): Path<String>,
    Json(payload): Json<UpdateAttendeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut attendee = state
        .attendee_repo
        .find_by_id(&user.user_id, &attendee_id)
        .await?
        .ok_or(AppError::NotFound("Attendee not found".into()))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        attendee.name = name;
    }
    if let Some(email) = payload.email {
        if email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".into()));
        }
        attendee.email = email;
    }
    if let Some(attended) = payload.attended {
        attendee.attended = attended;
    }

    let updated = state.attendee_repo.update(&attendee).await?;
    info!("Updated attendee {}", attendee_id);
    state.publish(ChangeEvent::AttendeeUpdated(updated.clone()));

    Ok(Json(updated))
}

pub async fn delete_attendee(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(attendee_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .attendee_repo
        .delete(&user.user_id, &attendee_id)
        .await?;
    info!("Deleted attendee {}", attendee_id);
    state.publish(ChangeEvent::AttendeeDeleted {
        owner_id: user.user_id,
        attendee_id,
    });
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

/// Flips the check-in flag; a second call reverts it.
pub async fn toggle_check_in(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(attendee_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut attendee = state
        .attendee_repo
        .find_by_id(&user.user_id, &attendee_id)
        .await?
        .ok_or(AppError::NotFound("Attendee not found".into()))?;

    attendee.attended = !attendee.attended;
    let updated = state.attendee_repo.update(&attendee).await?;

    info!(
        "Attendee {} marked as {}",
        attendee_id,
        if updated.attended { "attended" } else { "not attended" }
    );
    state.publish(ChangeEvent::AttendeeUpdated(updated.clone()));

    Ok(Json(updated))
}
