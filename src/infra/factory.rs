use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tokio::sync::broadcast;
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::aggregator::{LiveRegistry, StoreHandles};
use crate::domain::services::invitation_service::InvitationService;
use crate::domain::services::registration_service::RegistrationService;
use crate::infra::email::http_mail_service::HttpMailService;
use crate::infra::repositories::{
    postgres_attendee_repo::PostgresAttendeeRepo, postgres_event_repo::PostgresEventRepo,
    postgres_invitation_repo::PostgresInvitationRepo,
    postgres_registration_repo::PostgresRegistrationRepo,
    sqlite_attendee_repo::SqliteAttendeeRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_invitation_repo::SqliteInvitationRepo,
    sqlite_registration_repo::SqliteRegistrationRepo,
};
use crate::state::AppState;

const CHANGE_BUS_CAPACITY: usize = 256;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let mail_service = Arc::new(HttpMailService::new(
        config.mail_relay_url.clone(),
        config.mail_relay_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble_state(
            config,
            mail_service,
            Arc::new(PostgresEventRepo::new(pool.clone())),
            Arc::new(PostgresAttendeeRepo::new(pool.clone())),
            Arc::new(PostgresInvitationRepo::new(pool.clone())),
            Arc::new(PostgresRegistrationRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble_state(
            config,
            mail_service,
            Arc::new(SqliteEventRepo::new(pool.clone())),
            Arc::new(SqliteAttendeeRepo::new(pool.clone())),
            Arc::new(SqliteInvitationRepo::new(pool.clone())),
            Arc::new(SqliteRegistrationRepo::new(pool)),
        )
    }
}

pub fn assemble_state(
    config: &Config,
    mail_service: Arc<dyn crate::domain::ports::MailService>,
    event_repo: Arc<dyn crate::domain::ports::EventRepository>,
    attendee_repo: Arc<dyn crate::domain::ports::AttendeeRepository>,
    invitation_repo: Arc<dyn crate::domain::ports::InvitationRepository>,
    registration_repo: Arc<dyn crate::domain::ports::RegistrationRepository>,
) -> AppState {
    let (changes, _) = broadcast::channel(CHANGE_BUS_CAPACITY);

    let live = Arc::new(LiveRegistry::new(
        changes.clone(),
        StoreHandles {
            events: event_repo.clone(),
            attendees: attendee_repo.clone(),
            registrations: registration_repo.clone(),
        },
    ));

    let invitation_service = Arc::new(InvitationService::new(
        event_repo.clone(),
        invitation_repo.clone(),
        mail_service.clone(),
        config.public_base_url.clone(),
    ));

    let registration_service = Arc::new(RegistrationService::new(
        event_repo.clone(),
        invitation_repo.clone(),
        registration_repo.clone(),
        config.invite_policy,
    ));

    AppState {
        config: config.clone(),
        event_repo,
        attendee_repo,
        invitation_repo,
        registration_repo,
        mail_service,
        invitation_service,
        registration_service,
        changes,
        live,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
