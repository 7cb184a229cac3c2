use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{requests::AvailabilityQuery, responses::AvailabilityResponse};
use crate::api::extractors::tenant::TenantId;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path((_, service_id)): Path<(String, String)>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (service, days) = state
        .booking_service
        .availability(&tenant_id, &service_id, query.start, query.end, Utc::now())
        .await?;

    let open: usize = days.iter().map(|d| d.slots.len()).sum();
    info!(service_id = %service.id, days = days.len(), open_slots = open, "Availability listed");

    Ok(Json(AvailabilityResponse {
        service_id: service.id,
        duration_minutes: service.duration_minutes,
        days,
    }))
}
