use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{AppointmentRepository, ContactRepository, Notifier, ServiceRepository};
use crate::domain::services::booking_service::BookingService;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::notify::{email_notifier::{notification_templates, EmailNotifier}, log_notifier::LogNotifier};
use crate::infra::repositories::{
    memory_store::MemoryStore,
    postgres_appointment_repo::PostgresAppointmentRepo, postgres_contact_repo::PostgresContactRepo,
    postgres_service_repo::PostgresServiceRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo, sqlite_contact_repo::SqliteContactRepo,
    sqlite_service_repo::SqliteServiceRepo,
};

type Stores = (Arc<dyn ServiceRepository>, Arc<dyn ContactRepository>, Arc<dyn AppointmentRepository>);

pub async fn bootstrap_state(config: &Config) -> AppState {
    let notifier = build_notifier(config);
    bootstrap_state_with_notifier(config, notifier).await
}

pub fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    match &config.mail_service_url {
        Some(url) => {
            info!("Mail relay configured, sending notifications via {}", url);
            let email_service = Arc::new(HttpEmailService::new(
                url.clone(),
                config.mail_service_token.clone(),
                config.mail_from_alias.clone(),
            ));
            let templates = Arc::new(notification_templates().expect("Failed to load notification templates"));
            Arc::new(EmailNotifier::new(email_service, templates, config.contractor_email.clone()))
        }
        None => {
            info!("MAIL_SERVICE_URL not set, notifications are only logged");
            Arc::new(LogNotifier)
        }
    }
}

pub async fn bootstrap_state_with_notifier(config: &Config, notifier: Arc<dyn Notifier>) -> AppState {
    let database_url = &config.database_url;

    let (service_repo, contact_repo, appointment_repo): Stores = if is_memory_url(database_url) {
        info!("Using in-memory store");
        let store = Arc::new(MemoryStore::new());
        (store.clone(), store.clone(), store)
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
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

        (
            Arc::new(PostgresServiceRepo::new(pool.clone())),
            Arc::new(PostgresContactRepo::new(pool.clone())),
            Arc::new(PostgresAppointmentRepo::new(pool)),
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

        (
            Arc::new(SqliteServiceRepo::new(pool.clone())),
            Arc::new(SqliteContactRepo::new(pool.clone())),
            Arc::new(SqliteAppointmentRepo::new(pool)),
        )
    };

    let booking_service = Arc::new(BookingService::new(
        service_repo.clone(),
        contact_repo.clone(),
        appointment_repo.clone(),
        notifier,
    ));

    AppState {
        config: config.clone(),
        service_repo,
        contact_repo,
        appointment_repo,
        booking_service,
    }
}

fn is_memory_url(url: &str) -> bool {
    url == "memory" || url.starts_with("memory://")
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
