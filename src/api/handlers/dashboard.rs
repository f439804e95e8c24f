use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use tracing::info;

use crate::api::extractors::auth::AuthUser;
use crate::domain::services::aggregator::OwnerState;
use crate::error::AppError;
use crate::state::AppState;

/// One-shot dashboard snapshot, computed straight from the stores.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list(&user.user_id).await?;
    let attendees = state.attendee_repo.list(&user.user_id).await?;
    let registrations = state.registration_repo.list(&user.user_id).await?;

    let snapshot = OwnerState::from_records(user.user_id, events, attendees, registrations);
    Ok(Json(snapshot.view(Utc::now().date_naive())))
}

pub async fn list_registrants(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list(&user.user_id).await?;
    let attendees = state.attendee_repo.list(&user.user_id).await?;
    let registrations = state.registration_repo.list(&user.user_id).await?;

    let snapshot = OwnerState::from_records(user.user_id, events, attendees, registrations);
    Ok(Json(snapshot.registrants()))
}

/// Live dashboard stream. Each change to the owner's data pushes a
/// fresh view; the first item is the current snapshot. The lease is
/// held by the stream, so a disconnect releases the aggregator.
pub async fn live_dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    let lease = state.live.clone().subscribe_owner(&user.user_id).await?;
    info!("Opened live dashboard stream for owner {}", user.user_id);

    let stream = WatchStream::new(lease.receiver()).map(move |view| {
        let _ = &lease;
        Ok(SseEvent::default()
            .json_data(&view)
            .unwrap_or_else(|_| SseEvent::default().data("{}")))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Ends the owner's live context and stops their aggregator task.
pub async fn close_live(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.live.teardown(&user.user_id).await;
    Ok(Json(serde_json::json!({"status": "closed"})))
}
