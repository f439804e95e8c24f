use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dtos::responses::{EventAttendance, ReportResponse};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub event_type: Option<String>,
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list(&user.user_id).await?;
    let attendees = state.attendee_repo.list(&user.user_id).await?;

    // Type counts always cover the full event set, so the filter
    // dropdown keeps showing every category.
    let mut event_type_counts: HashMap<String, usize> = HashMap::new();
    for event in &events {
        *event_type_counts.entry(event.event_type.clone()).or_insert(0) += 1;
    }

    let filtered: Vec<_> = match &query.event_type {
        Some(event_type) => events
            .iter()
            .filter(|e| &e.event_type == event_type)
            .collect(),
        None => events.iter().collect(),
    };

    let attendance_by_event: Vec<EventAttendance> = filtered
        .iter()
        .map(|event| {
            let for_event: Vec<_> = attendees
                .iter()
                .filter(|a| a.event_id == event.id)
                .collect();
            EventAttendance {
                event_id: event.id.clone(),
                name: event.name.clone(),
                total: for_event.len(),
                checked_in: for_event.iter().filter(|a| a.attended).count(),
            }
        })
        .collect();

    let total_attendees: usize = attendance_by_event.iter().map(|e| e.total).sum();
    let checked_in_attendees: usize = attendance_by_event.iter().map(|e| e.checked_in).sum();
    let attendance_rate = if total_attendees == 0 {
        0.0
    } else {
        (checked_in_attendees as f64 / total_attendees as f64 * 1000.0).round() / 10.0
    };

    Ok(Json(ReportResponse {
        total_events: filtered.len(),
        total_attendees,
        checked_in_attendees,
        attendance_rate,
        attendance_by_event,
        event_type_counts,
    }))
}
