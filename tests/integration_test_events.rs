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
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_event_crud_lifecycle() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let created = app.create_event(&token, "Launch Party", &date_in(7)).await;
    let event_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Launch Party");
    assert_eq!(created["owner_id"], "owner-1");

    let (status, listed) = app.request("GET", "/api/v1/events", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/v1/events/{}", event_id),
            Some(&token),
            Some(json!({ "name": "Launch Party v2", "location": "Hall B" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Launch Party v2");
    assert_eq!(updated["location"], "Hall B");
    assert_eq!(updated["time"], "18:00");

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/v1/events/{}", event_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/events/{}", event_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_requires_auth() {
    let app = TestApp::new().await;

    let (status, _) = app.request("GET", "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/v1/events", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_event_validation() {
    let app = TestApp::new().await;
    let token = app.auth_token("owner-1");

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/events",
            Some(&token),
            Some(json!({
                "name": "  ",
                "date": date_in(1),
                "time": "18:00",
                "location": "Hall A",
                "event_type": "meetup"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/events",
            Some(&token),
            Some(json!({
                "name": "Bad time",
                "date": date_in(1),
                "time": "25:99",
                "location": "Hall A",
                "event_type": "meetup"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_events_are_scoped_per_owner() {
    let app = TestApp::new().await;
    let alice = app.auth_token("alice");
    let bob = app.auth_token("bob");

    let created = app.create_event(&alice, "Alice Only", &date_in(3)).await;
    let event_id = created["id"].as_str().unwrap();

    let (status, listed) = app.request("GET", "/api/v1/events", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/events/{}", event_id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob cannot delete it either.
    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/v1/events/{}", event_id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, still_there) = app
        .request(
            "GET",
            &format!("/api/v1/events/{}", event_id),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(still_there["name"], "Alice Only");
}
