use async_trait::async_trait;
use tracing::info;

use crate::domain::{
    models::{appointment::Appointment, contact::Contact},
    ports::Notifier,
};
use crate::error::AppError;

/// Used when no mail relay is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_client_pending(&self, contact: &Contact, appointment: &Appointment) -> Result<(), AppError> {
        info!(contact_id = %contact.id, appointment_id = %appointment.id, "notify: client pending");
        Ok(())
    }

    async fn notify_client_confirmed(&self, contact: &Contact, appointment: &Appointment) -> Result<(), AppError> {
        info!(contact_id = %contact.id, appointment_id = %appointment.id, "notify: client confirmed");
        Ok(())
    }

    async fn notify_client_declined(&self, contact: &Contact, appointment: &Appointment, reason: Option<&str>) -> Result<(), AppError> {
        info!(contact_id = %contact.id, appointment_id = %appointment.id, reason = reason.unwrap_or(""), "notify: client declined");
        Ok(())
    }

    async fn notify_contractor(&self, appointment: &Appointment, is_pending: bool) -> Result<(), AppError> {
        info!(appointment_id = %appointment.id, is_pending, "notify: contractor");
        Ok(())
    }
}
