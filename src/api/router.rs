use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointment, availability, booking, health};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public Booking Flow
        .route("/api/v1/{tenant_id}/services/{service_id}/availability", get(availability::get_availability))
        .route("/api/v1/{tenant_id}/services/{service_id}/book", post(booking::create_booking))

        // Contractor
        .route("/api/v1/{tenant_id}/appointments", post(appointment::create_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}", get(appointment::get_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/confirm", post(appointment::confirm_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/decline", post(appointment::decline_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/start", post(appointment::start_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/complete", post(appointment::complete_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/cancel", post(appointment::cancel_appointment))

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
                        tenant_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
