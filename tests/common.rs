use eventhub_backend::{
    api::router::create_router,
    config::{Config, InvitePolicy},
    domain::ports::MailService,
    error::AppError,
    infra::factory::assemble_state,
    infra::repositories::{
        sqlite_attendee_repo::SqliteAttendeeRepo, sqlite_event_repo::SqliteEventRepo,
        sqlite_invitation_repo::SqliteInvitationRepo,
        sqlite_registration_repo::SqliteRegistrationRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_AUDIENCE: &str = "eventhub-frontend";

/// Records every send instead of talking to the relay.
pub struct MockMailService {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl MockMailService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MailService for MockMailService {
    async fn send_invite(&self, email: &str, event_id: &str, token: &str) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((
            email.to_string(),
            event_id.to_string(),
            token.to_string(),
        ));
        Ok(())
    }
}

pub struct FailingMailService;

#[async_trait]
impl MailService for FailingMailService {
    async fn send_invite(&self, _: &str, _: &str, _: &str) -> Result<(), AppError> {
        Err(AppError::NotificationDelivery("relay unreachable".into()))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mail: Arc<MockMailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(InvitePolicy::SingleUse).await
    }

    pub async fn with_policy(policy: InvitePolicy) -> Self {
        let mail = Arc::new(MockMailService::new());
        Self::build(policy, mail.clone(), mail).await
    }

    /// Harness whose mail relay always fails delivery.
    pub async fn with_failing_mail() -> Self {
        Self::build(
            InvitePolicy::SingleUse,
            Arc::new(FailingMailService),
            Arc::new(MockMailService::new()),
        )
        .await
    }

    async fn build(
        policy: InvitePolicy,
        mail_service: Arc<dyn MailService>,
        mail: Arc<MockMailService>,
    ) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_relay_url: "http://localhost".to_string(),
            mail_relay_token: "token".to_string(),
            public_base_url: "http://localhost:5173".to_string(),
            auth_public_key: include_str!("keys/test_public.pem").to_string(),
            auth_audience: TEST_AUDIENCE.to_string(),
            invite_policy: policy,
        };

        let state = Arc::new(assemble_state(
            &config,
            mail_service,
            Arc::new(SqliteEventRepo::new(pool.clone())),
            Arc::new(SqliteAttendeeRepo::new(pool.clone())),
            Arc::new(SqliteInvitationRepo::new(pool.clone())),
            Arc::new(SqliteRegistrationRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            mail,
        }
    }

    /// Mints a bearer token the way the external identity provider
    /// would, signed with the test Ed25519 key.
    pub fn auth_token(&self, user_id: &str) -> String {
        let claims = serde_json::json!({
            "sub": user_id,
            "aud": TEST_AUDIENCE,
            "exp": (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
            "email": format!("{}@test.local", user_id),
        });
        let key = EncodingKey::from_ed_pem(include_str!("keys/test_private.pem").as_bytes())
            .expect("invalid test signing key");
        jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &key)
            .expect("failed to sign test token")
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn create_event(&self, token: &str, name: &str, date: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/events",
                Some(token),
                Some(serde_json::json!({
                    "name": name,
                    "date": date,
                    "time": "18:00",
                    "location": "Hall A",
                    "event_type": "conference"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create_event failed: {}", body);
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
