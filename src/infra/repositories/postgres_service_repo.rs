use crate::domain::{models::service::ServiceConfig, ports::ServiceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresServiceRepo {
    pool: PgPool,
}

impl PostgresServiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepo {
    async fn create(&self, service: &ServiceConfig) -> Result<ServiceConfig, AppError> {
        service.validate().map_err(AppError::Validation)?;
        sqlx::query_as::<_, ServiceConfig>(
            "INSERT INTO services (id, tenant_id, name, duration_minutes, buffer_minutes, working_hours, timezone, timezone_offset_hours, advance_booking_days, same_day_booking_allowed, max_concurrent_bookings_per_slot, requires_confirmation, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *"
        )
            .bind(&service.id).bind(&service.tenant_id).bind(&service.name)
            .bind(service.duration_minutes).bind(service.buffer_minutes).bind(&service.working_hours)
            .bind(&service.timezone).bind(service.timezone_offset_hours).bind(service.advance_booking_days)
            .bind(service.same_day_booking_allowed).bind(service.max_concurrent_bookings_per_slot)
            .bind(service.requires_confirmation).bind(service.is_active).bind(service.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<ServiceConfig>, AppError> {
        sqlx::query_as::<_, ServiceConfig>("SELECT * FROM services WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, service: &ServiceConfig) -> Result<ServiceConfig, AppError> {
        service.validate().map_err(AppError::Validation)?;
        sqlx::query_as::<_, ServiceConfig>(
            "UPDATE services SET name=$1, duration_minutes=$2, buffer_minutes=$3, working_hours=$4, timezone=$5, timezone_offset_hours=$6, advance_booking_days=$7, same_day_booking_allowed=$8, max_concurrent_bookings_per_slot=$9, requires_confirmation=$10, is_active=$11
             WHERE id=$12 AND tenant_id=$13
             RETURNING *"
        )
            .bind(&service.name).bind(service.duration_minutes).bind(service.buffer_minutes)
            .bind(&service.working_hours).bind(&service.timezone).bind(service.timezone_offset_hours)
            .bind(service.advance_booking_days).bind(service.same_day_booking_allowed)
            .bind(service.max_concurrent_bookings_per_slot).bind(service.requires_confirmation)
            .bind(service.is_active).bind(&service.id).bind(&service.tenant_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", service.id)))
    }
}
