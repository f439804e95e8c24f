use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{
    attendee, dashboard, event, health, invitation, registration, report,
};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Events
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route(
            "/api/v1/events/{event_id}",
            get(event::get_event).put(event::update_event).delete(event::delete_event),
        )

        // Attendees
        .route(
            "/api/v1/events/{event_id}/attendees",
            post(attendee::create_attendee).get(attendee::list_attendees),
        )
        .route(
            "/api/v1/attendees/{attendee_id}",
            put(attendee::update_attendee).delete(attendee::delete_attendee),
        )
        .route(
            "/api/v1/attendees/{attendee_id}/check-in",
            post(attendee::toggle_check_in),
        )

        // Invitations
        .route(
            "/api/v1/events/{event_id}/invitations",
            post(invitation::issue_invitation).get(invitation::list_invitations),
        )
        .route(
            "/api/v1/events/{event_id}/invite-link",
            post(invitation::create_invite_link),
        )

        // Public registration flow
        .route("/api/v1/register/{token}", get(registration::resolve_invitation))
        .route("/api/v1/register", post(registration::register))
        .route("/api/v1/registrations", get(registration::list_registrations))
        .route("/api/v1/registrants", get(dashboard::list_registrants))

        // Dashboard & reports
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route(
            "/api/v1/live",
            get(dashboard::live_dashboard).delete(dashboard::close_live),
        )
        .route("/api/v1/reports", get(report::get_report))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!(
                        "started processing request: {} {}",
                        request.method(),
                        request.uri().path()
                    );
                })
                .on_response(
                    |response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                        info!(
                            status = response.status().as_u16(),
                            latency_ms = latency.as_millis(),
                            "finished processing request"
                        );
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        error!("request failed: {:?}", error);
                    },
                ),
        )
        .with_state(state)
}
