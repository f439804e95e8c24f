use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{CreateEventRequest, UpdateEventRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{change::ChangeEvent, event::Event};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

fn validate_time(time: &str) -> Result<(), AppError> {
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::Validation("Time must be HH:MM".into()))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Event name is required".into()));
    }
    validate_time(&payload.time)?;

    let event = Event::new(
        user.user_id.clone(),
        payload.name,
        payload.date,
        payload.time,
        payload.location,
        payload.event_type,
    );
    let created = state.event_repo.create(&event).await?;

    info!("Created event {} for owner {}", created.id, user.user_id);
    state.publish(ChangeEvent::EventCreated(created.clone()));

    Ok(Json(created))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list(&user.user_id).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&user.user_id, &event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state
        .event_repo
        .find_by_id(&user.user_id, &event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Event name is required".into()));
        }
        event.name = name;
    }
    if let Some(date) = payload.date {
        event.date = date;
    }
    if let Some(time) = payload.time {
        validate_time(&time)?;
        event.time = time;
    }
    if let Some(location) = payload.location {
        event.location = location;
    }
    if let Some(event_type) = payload.event_type {
        event.event_type = event_type;
    }

    let updated = state.event_repo.update(&event).await?;
    info!("Updated event {}", event_id);
    state.publish(ChangeEvent::EventUpdated(updated.clone()));

    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.delete(&user.user_id, &event_id).await?;
    info!("Deleted event {}", event_id);
    state.publish(ChangeEvent::EventDeleted {
        owner_id: user.user_id,
        event_id,
    });
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
