#![allow(dead_code)]

use contractor_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{
        appointment::Appointment,
        contact::Contact,
        service::{NewServiceParams, ServiceConfig, WeeklyHours},
    },
    domain::ports::Notifier,
    error::AppError,
    infra::factory::bootstrap_state_with_notifier,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Captures notifier calls as `kind:appointment_id[:detail]` strings.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Notifications run on spawned tasks; poll until `count` have landed.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let events = self.snapshot();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.snapshot()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_client_pending(&self, _contact: &Contact, appointment: &Appointment) -> Result<(), AppError> {
        self.record(format!("client-pending:{}", appointment.id));
        Ok(())
    }

    async fn notify_client_confirmed(&self, _contact: &Contact, appointment: &Appointment) -> Result<(), AppError> {
        self.record(format!("client-confirmed:{}", appointment.id));
        Ok(())
    }

    async fn notify_client_declined(&self, _contact: &Contact, appointment: &Appointment, reason: Option<&str>) -> Result<(), AppError> {
        self.record(format!("client-declined:{}:{}", appointment.id, reason.unwrap_or("-")));
        Ok(())
    }

    async fn notify_contractor(&self, appointment: &Appointment, is_pending: bool) -> Result<(), AppError> {
        self.record(format!("contractor:{}:{}", appointment.id, is_pending));
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify_client_pending(&self, _contact: &Contact, _appointment: &Appointment) -> Result<(), AppError> {
        Err(AppError::InternalWithMsg("mail relay down".into()))
    }

    async fn notify_client_confirmed(&self, _contact: &Contact, _appointment: &Appointment) -> Result<(), AppError> {
        Err(AppError::InternalWithMsg("mail relay down".into()))
    }

    async fn notify_client_declined(&self, _contact: &Contact, _appointment: &Appointment, _reason: Option<&str>) -> Result<(), AppError> {
        Err(AppError::InternalWithMsg("mail relay down".into()))
    }

    async fn notify_contractor(&self, _appointment: &Appointment, _is_pending: bool) -> Result<(), AppError> {
        Err(AppError::InternalWithMsg("mail relay down".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub notifier: Arc<RecordingNotifier>,
    pub tenant_id: String,
    pub db_filename: Option<String>,
}

impl TestApp {
    /// In-memory store.
    pub async fn new() -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        Self::build("memory://".to_string(), None, notifier.clone(), notifier).await
    }

    /// Fresh SQLite file per test, removed on drop.
    pub async fn sqlite() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);
        let notifier = Arc::new(RecordingNotifier::default());
        Self::build(db_url, Some(db_filename), notifier.clone(), notifier).await
    }

    /// PostgreSQL from `TEST_POSTGRES_URL`; `None` when it is not set.
    pub async fn postgres() -> Option<Self> {
        let db_url = std::env::var("TEST_POSTGRES_URL").ok()?;
        let notifier = Arc::new(RecordingNotifier::default());
        Some(Self::build(db_url, None, notifier.clone(), notifier).await)
    }

    pub async fn with_failing_notifier() -> Self {
        Self::build("memory://".to_string(), None, Arc::new(FailingNotifier), Arc::new(RecordingNotifier::default())).await
    }

    async fn build(
        database_url: String,
        db_filename: Option<String>,
        notifier: Arc<dyn Notifier>,
        recorder: Arc<RecordingNotifier>,
    ) -> Self {
        let mut config = Config::in_memory(ADMIN_TOKEN);
        config.database_url = database_url;

        let state = Arc::new(bootstrap_state_with_notifier(&config, notifier).await);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            notifier: recorder,
            tenant_id: format!("tenant-{}", Uuid::new_v4()),
            db_filename,
        }
    }

    /// Every day 08:00-18:00 UTC, 60 min slots, no buffer, 30 days ahead,
    /// no same-day, capacity 1. `tweak` adjusts before insert.
    pub async fn seed_service(&self, tweak: impl FnOnce(&mut ServiceConfig)) -> ServiceConfig {
        let mut service = ServiceConfig::new(NewServiceParams {
            tenant_id: self.tenant_id.clone(),
            name: "Gutter cleaning".into(),
            duration_minutes: 60,
            buffer_minutes: 0,
            working_hours: WeeklyHours::every_day(8 * 60, 18 * 60),
            timezone: Some("UTC".into()),
            timezone_offset_hours: 0,
            advance_booking_days: 30,
            same_day_booking_allowed: false,
            max_concurrent_bookings_per_slot: 1,
            requires_confirmation: false,
        });
        tweak(&mut service);
        self.state.service_repo.create(&service).await.expect("Failed to seed service")
    }

    pub fn book_uri(&self, service_id: &str) -> String {
        format!("/api/v1/{}/services/{}/book", self.tenant_id, service_id)
    }

    pub fn availability_uri(&self, service_id: &str) -> String {
        format!("/api/v1/{}/services/{}/availability", self.tenant_id, service_id)
    }

    pub fn appointment_uri(&self, appointment_id: &str, action: &str) -> String {
        if action.is_empty() {
            format!("/api/v1/{}/appointments/{}", self.tenant_id, appointment_id)
        } else {
            format!("/api/v1/{}/appointments/{}/{}", self.tenant_id, appointment_id, action)
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.router.clone().oneshot(
            Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
        ).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.router.clone().oneshot(
            Request::builder().method("POST").uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())).unwrap()
        ).await.unwrap()
    }

    pub async fn admin_get(&self, uri: &str) -> Response {
        self.router.clone().oneshot(
            Request::builder().method("GET").uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
                .body(Body::empty()).unwrap()
        ).await.unwrap()
    }

    pub async fn admin_post(&self, uri: &str, body: Option<&Value>) -> Response {
        let builder = Request::builder().method("POST").uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN));
        let request = match body {
            Some(b) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(b.to_string())),
            None => builder.body(Body::empty()),
        };
        self.router.clone().oneshot(request.unwrap()).await.unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(file) = &self.db_filename {
            let _ = std::fs::remove_file(file);
            let _ = std::fs::remove_file(format!("{}-wal", file));
            let _ = std::fs::remove_file(format!("{}-shm", file));
        }
    }
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A UTC day safely inside the default policy: not today, within 30 days.
pub fn future_day(days_ahead: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days_ahead)).date_naive()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
}

pub fn booking_body(start: DateTime<Utc>, name: &str, email: &str) -> Value {
    serde_json::json!({
        "start_time": start.to_rfc3339(),
        "contact": { "name": name, "email": email },
    })
}
