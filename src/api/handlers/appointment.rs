use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{requests::{CreateAppointmentRequest, ReasonRequest}, responses::BookingResponse};
use crate::api::extractors::{auth::ContractorAuth, json::ApiJson, tenant::TenantId};
use crate::domain::models::reservation::ManualAppointmentRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    ApiJson(payload): ApiJson<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_appointment: manual entry for service {}", payload.service_id);

    let request = ManualAppointmentRequest {
        tenant_id,
        service_id: payload.service_id,
        start: payload.start_time,
        contact: payload.contact,
        location: payload.location,
        notes: payload.notes,
    };

    let reservation = state.booking_service.create_manual(request).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(reservation))))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.booking_service.get(&tenant_id, &id).await?;
    Ok(Json(appointment))
}

pub async fn confirm_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.booking_service.confirm(&tenant_id, &id).await?;
    Ok(Json(appointment))
}

pub async fn decline_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
    payload: Option<ApiJson<ReasonRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let body = payload.map(|ApiJson(body)| body).unwrap_or_default();
    let appointment = state.booking_service.decline(&tenant_id, &id, body.reason).await?;
    Ok(Json(appointment))
}

pub async fn start_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.booking_service.start(&tenant_id, &id).await?;
    Ok(Json(appointment))
}

pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.booking_service.complete(&tenant_id, &id).await?;
    Ok(Json(appointment))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    _auth: ContractorAuth,
    TenantId(tenant_id): TenantId,
    Path((_, id)): Path<(String, String)>,
    payload: Option<ApiJson<ReasonRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let body = payload.map(|ApiJson(body)| body).unwrap_or_default();
    let appointment = state.booking_service.cancel(&tenant_id, &id, body.reason).await?;
    Ok(Json(appointment))
}
