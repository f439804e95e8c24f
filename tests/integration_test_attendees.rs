mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::json;

fn date_in(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_attendee_lifecycle_with_check_in_toggle() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let event = app.create_event(&token, "Meetup", &date_in(2)).await;
    let event_id = event["id"].as_str().unwrap();

    let (status, attendee) = app
        .request(
            "POST",
            &format!("/api/v1/events/{}/attendees", event_id),
            Some(&token),
            Some(json!({ "name": "Ann", "email": "ann@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attendee["attended"], false);
    let attendee_id = attendee["id"].as_str().unwrap().to_string();

    let (status, listed) = app
        .request(
            "GET",
            &format!("/api/v1/events/{}/attendees", event_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // First toggle checks in, second reverts.
    let (status, toggled) = app
        .request(
            "POST",
            &format!("/api/v1/attendees/{}/check-in", attendee_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["attended"], true);

    let (_, toggled_back) = app
        .request(
            "POST",
            &format!("/api/v1/attendees/{}/check-in", attendee_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(toggled_back["attended"], false);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/v1/attendees/{}", attendee_id),
            Some(&token),
            Some(json!({ "name": "Ann Updated" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ann Updated");
    assert_eq!(updated["email"], "ann@x.com");

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/v1/attendees/{}", attendee_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = app
        .request(
            "GET",
            &format!("/api/v1/events/{}/attendees", event_id),
            Some(&token),
            None,
        )
        .await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_attendee_rejects_unknown_event_and_blank_fields() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/events/no-such-event/attendees",
            Some(&token),
            Some(json!({ "name": "Ann", "email": "ann@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let event = app.create_event(&token, "Meetup", &date_in(2)).await;
    let event_id = event["id"].as_str().unwrap();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/events/{}/attendees", event_id),
            Some(&token),
            Some(json!({ "name": "", "email": "ann@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attendee_cannot_join_another_owners_event() {
    let app = TestApp::new().await;
    let alice = app.auth_token("alice");
    let bob = app.auth_token("bob");

    let event = app.create_event(&alice, "Private", &date_in(2)).await;
    let event_id = event["id"].as_str().unwrap();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/events/{}/attendees", event_id),
            Some(&bob),
            Some(json!({ "name": "Mallory", "email": "m@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
