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

async fn add_attendee(app: &TestApp, token: &str, event_id: &str, name: &str, email: &str) -> String {
    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/events/{}/attendees", event_id),
            Some(token),
            Some(json!({ "name": name, "email": email })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_dashboard_counts_and_recent_activity() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let upcoming = app.create_event(&token, "Upcoming", &date_in(5)).await;
    app.create_event(&token, "Past", &date_in(-5)).await;
    let event_id = upcoming["id"].as_str().unwrap();

    let ann = add_attendee(&app, &token, event_id, "Ann", "ann@x.com").await;
    add_attendee(&app, &token, event_id, "Ben", "ben@x.com").await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/attendees/{}/check-in", ann),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, view) = app
        .request("GET", "/api/v1/dashboard", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["total_events"], 2);
    assert_eq!(view["upcoming_events"], 1);
    assert_eq!(view["checked_in_attendees"], 1);

    let feed = view["recent_activity"].as_array().unwrap();
    assert!(feed.len() <= 5);
    assert!(feed
        .iter()
        .any(|e| e["message"] == "Attendee \"Ann\" added to \"Upcoming\""));
}

#[tokio::test]
async fn test_registrants_merge_attendees_and_registrations() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let event = app.create_event(&token, "Summit", &date_in(5)).await;
    let event_id = event["id"].as_str().unwrap();

    add_attendee(&app, &token, event_id, "Ann Walk-in", "ann@x.com").await;
    add_attendee(&app, &token, event_id, "Ben", "ben@x.com").await;

    let (_, invite) = app
        .request(
            "POST",
            &format!("/api/v1/events/{}/invitations", event_id),
            Some(&token),
            Some(json!({ "email": "ann@x.com" })),
        )
        .await;
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/register",
            None,
            Some(json!({
                "token": invite["token"],
                "name": "Ann Registered",
                "email": "ann@x.com",
                "phone": "555"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, registrants) = app
        .request("GET", "/api/v1/registrants", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let registrants = registrants.as_array().unwrap();
    assert_eq!(registrants.len(), 2);

    // Ann's registration record wins over her walk-in attendee record.
    let ann = registrants
        .iter()
        .find(|r| r["email"] == "ann@x.com")
        .unwrap();
    assert_eq!(ann["source"], "registration");
    assert_eq!(ann["name"], "Ann Registered");
    assert!(ann["ticket_id"].is_string());

    let ben = registrants
        .iter()
        .find(|r| r["email"] == "ben@x.com")
        .unwrap();
    assert_eq!(ben["source"], "attendee");
}

#[tokio::test]
async fn test_dashboard_is_isolated_per_owner() {
    let app = TestApp::new().await;
    let alice = app.auth_token("alice");
    let bob = app.auth_token("bob");

    let event = app.create_event(&alice, "Alice Fest", &date_in(3)).await;
    add_attendee(&app, &alice, event["id"].as_str().unwrap(), "Ann", "ann@x.com").await;

    let (status, view) = app
        .request("GET", "/api/v1/dashboard", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["total_events"], 0);
    assert!(view["recent_activity"].as_array().unwrap().is_empty());
    assert!(view["registrants"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_close_live_context() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");
    app.create_event(&token, "Stream", &date_in(3)).await;

    // Subscribe the way the live endpoint would.
    let lease = app
        .state
        .live
        .clone()
        .subscribe_owner("owner-1")
        .await
        .unwrap();
    assert_eq!(lease.current_view().total_events, 1);

    let (status, body) = app.request("DELETE", "/api/v1/live", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert!(app.state.live.existing("owner-1").await.is_none());
}

#[tokio::test]
async fn test_live_view_follows_changes() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let lease = app
        .state
        .live
        .clone()
        .subscribe_owner("owner-1")
        .await
        .unwrap();
    let mut view_rx = lease.receiver();
    assert_eq!(view_rx.borrow().total_events, 0);

    app.create_event(&token, "Fresh", &date_in(3)).await;

    view_rx.changed().await.unwrap();
    let view = view_rx.borrow().clone();
    assert_eq!(view.total_events, 1);
    assert_eq!(view.recent_activity[0].message, "Event \"Fresh\" added");
}

#[tokio::test]
async fn test_aggregator_stops_when_last_lease_drops() {
    let app = TestApp::new().await;

    {
        let _lease = app
            .state
            .live
            .clone()
            .subscribe_owner("owner-1")
            .await
            .unwrap();
        assert!(app.state.live.existing("owner-1").await.is_some());
    }

    // Release runs on a spawned task; give it a beat.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.state.live.existing("owner-1").await.is_none());
}

#[tokio::test]
async fn test_aggregator_survives_until_last_lease_drops() {
    let app = TestApp::new().await;

    let first = app
        .state
        .live
        .clone()
        .subscribe_owner("owner-1")
        .await
        .unwrap();
    let second = app
        .state
        .live
        .clone()
        .subscribe_owner("owner-1")
        .await
        .unwrap();

    drop(first);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.state.live.existing("owner-1").await.is_some());

    drop(second);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.state.live.existing("owner-1").await.is_none());
}
