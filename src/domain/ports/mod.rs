use crate::domain::models::{
    service::ServiceConfig, contact::Contact,
    appointment::{Appointment, AppointmentStatus},
    reservation::{ReservationRequest, ManualAppointmentRequest, Reservation},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &ServiceConfig) -> Result<ServiceConfig, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<ServiceConfig>, AppError>;
    async fn update(&self, service: &ServiceConfig) -> Result<ServiceConfig, AppError>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: &Contact) -> Result<Contact, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Contact>, AppError>;
    async fn find_by_email(&self, tenant_id: &str, email: &str) -> Result<Option<Contact>, AppError>;
}

/// The appointment store is the single writer of appointments. `reserve`
/// and `create_manual` must make the overlap count and the insert
/// indivisible with respect to concurrent writers on the same service.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn list_active_in_range(&self, service_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError>;
    async fn reserve(&self, request: &ReservationRequest) -> Result<Reservation, AppError>;
    async fn create_manual(&self, request: &ManualAppointmentRequest) -> Result<Reservation, AppError>;
    /// Compare-and-set on status. `Ok(None)` when the appointment is missing
    /// or no longer in `expected`.
    async fn transition(
        &self,
        tenant_id: &str,
        id: &str,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Option<Appointment>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}

/// Fire-and-forget outbound notifications. Failures never fail a booking.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_client_pending(&self, contact: &Contact, appointment: &Appointment) -> Result<(), AppError>;
    async fn notify_client_confirmed(&self, contact: &Contact, appointment: &Appointment) -> Result<(), AppError>;
    async fn notify_client_declined(&self, contact: &Contact, appointment: &Appointment, reason: Option<&str>) -> Result<(), AppError>;
    async fn notify_contractor(&self, appointment: &Appointment, is_pending: bool) -> Result<(), AppError>;
}
