use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{requests::BookRequest, responses::BookingResponse};
use crate::api::extractors::{json::ApiJson, tenant::TenantId};
use crate::domain::models::reservation::ReservationRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path((_, service_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<BookRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_booking: service {} at {}", service_id, payload.start_time);

    let request = ReservationRequest {
        tenant_id,
        service_id,
        start: payload.start_time,
        contact: payload.contact,
        location: payload.location,
        notes: payload.notes,
        now: Utc::now(),
    };

    let reservation = state.booking_service.book(request).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(reservation))))
}
