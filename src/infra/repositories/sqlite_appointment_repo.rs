use crate::domain::{
    models::{
        appointment::{Appointment, AppointmentStatus},
        contact::{Contact, ContactInput, ContactResolution},
        reservation::{ManualAppointmentRequest, Reservation, ReservationRequest},
        service::ServiceConfig,
    },
    ports::AppointmentRepository,
    services::reservation,
};
use crate::error::{AppError, BookingError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// The no-op UPDATE is the transaction's first statement, so it takes the
/// database write lock before anything is read.
async fn lock_service(conn: &mut SqliteConnection, tenant_id: &str, service_id: &str) -> Result<ServiceConfig, AppError> {
    let touched = sqlx::query("UPDATE services SET is_active = is_active WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id).bind(service_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    if touched.rows_affected() == 0 {
        return Err(BookingError::ServiceNotFound.into());
    }
    sqlx::query_as::<_, ServiceConfig>("SELECT * FROM services WHERE id = ?")
        .bind(service_id)
        .fetch_one(&mut *conn).await.map_err(AppError::Database)
}

async fn active_overlapping(conn: &mut SqliteConnection, service_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
    sqlx::query_as::<_, Appointment>(
        "SELECT * FROM appointments
         WHERE service_id = ? AND start_time < ? AND end_time > ?
         AND status IN ('pending-confirmation', 'scheduled', 'in-progress')
         ORDER BY start_time ASC"
    )
        .bind(service_id).bind(end).bind(start)
        .fetch_all(&mut *conn).await.map_err(AppError::Database)
}

async fn resolve_contact(conn: &mut SqliteConnection, tenant_id: &str, input: &ContactInput) -> Result<ContactResolution, AppError> {
    if let Some(id) = input.contact_id() {
        return sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&mut *conn).await.map_err(AppError::Database)?
            .map(ContactResolution::Existing)
            .ok_or_else(|| reservation::contact_not_found(id));
    }
    if let Some(email) = input.normalized_email() {
        let existing = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE tenant_id = ? AND email = ?")
            .bind(tenant_id).bind(&email)
            .fetch_optional(&mut *conn).await.map_err(AppError::Database)?;
        if let Some(contact) = existing {
            return Ok(ContactResolution::Existing(contact));
        }
    }
    reservation::new_contact(tenant_id, input).map(ContactResolution::Create)
}

async fn insert_reservation(conn: &mut SqliteConnection, resolution: ContactResolution, appointment: &Appointment) -> Result<Reservation, AppError> {
    let contact = match resolution {
        ContactResolution::Existing(contact) => contact,
        ContactResolution::Create(contact) => {
            sqlx::query_as::<_, Contact>(
                "INSERT INTO contacts (id, tenant_id, first_name, last_name, email, phone, company, notes, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING *"
            )
                .bind(&contact.id).bind(&contact.tenant_id).bind(&contact.first_name).bind(&contact.last_name)
                .bind(&contact.email).bind(&contact.phone).bind(&contact.company).bind(&contact.notes)
                .bind(contact.created_at)
                .fetch_one(&mut *conn).await.map_err(AppError::Database)?
        }
    };

    let appointment = sqlx::query_as::<_, Appointment>(
        "INSERT INTO appointments (id, tenant_id, service_id, contact_id, start_time, end_time, status, location, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *"
    )
        .bind(&appointment.id).bind(&appointment.tenant_id).bind(&appointment.service_id).bind(&appointment.contact_id)
        .bind(appointment.start_time).bind(appointment.end_time).bind(appointment.status.as_str())
        .bind(&appointment.location).bind(&appointment.notes).bind(appointment.created_at)
        .fetch_one(&mut *conn).await.map_err(AppError::Database)?;

    Ok(Reservation { appointment, contact })
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_in_range(&self, service_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        active_overlapping(&mut conn, service_id, start, end).await
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let service = lock_service(&mut tx, &request.tenant_id, &request.service_id).await?;
        let slot = reservation::admit(&service, request.start, request.now)?;
        let active = active_overlapping(&mut tx, &service.id, slot.start, slot.end).await?;
        reservation::ensure_capacity(&service, &slot, &active)?;

        let resolution = resolve_contact(&mut tx, &request.tenant_id, &request.contact).await?;
        let appointment = reservation::public_appointment(&service, request, &resolution.contact().id);
        let created = insert_reservation(&mut tx, resolution, &appointment).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn create_manual(&self, request: &ManualAppointmentRequest) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let service = lock_service(&mut tx, &request.tenant_id, &request.service_id).await?;
        let slot = reservation::slot_at(&service, request.start);
        let active = active_overlapping(&mut tx, &service.id, slot.start, slot.end).await?;
        reservation::ensure_no_conflict(&service, &slot, &active)?;

        let resolution = resolve_contact(&mut tx, &request.tenant_id, &request.contact).await?;
        let appointment = reservation::manual_appointment(&service, request, &resolution.contact().id);
        let created = insert_reservation(&mut tx, resolution, &appointment).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn transition(
        &self,
        tenant_id: &str,
        id: &str,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = ?, notes = COALESCE(?, notes)
             WHERE tenant_id = ? AND id = ? AND status = ?
             RETURNING *"
        )
            .bind(next.as_str()).bind(notes)
            .bind(tenant_id).bind(id).bind(expected.as_str())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
