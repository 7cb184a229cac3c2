use std::future::Future;
use std::sync::Arc;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, info_span, warn, Instrument};

use crate::domain::{
    models::{
        appointment::{Appointment, AppointmentStatus},
        reservation::{ManualAppointmentRequest, Reservation, ReservationRequest},
        service::ServiceConfig,
        slot::DayAvailability,
    },
    ports::{AppointmentRepository, ContactRepository, Notifier, ServiceRepository},
    services::{
        availability::{fetch_window, list_availability, resolve_range},
        status_machine::{self, StatusAction},
    },
};
use crate::error::{AppError, BookingError};

/// Listing, reservation and lifecycle operations over the ports.
pub struct BookingService {
    service_repo: Arc<dyn ServiceRepository>,
    contact_repo: Arc<dyn ContactRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
    notifier: Arc<dyn Notifier>,
}

impl BookingService {
    pub fn new(
        service_repo: Arc<dyn ServiceRepository>,
        contact_repo: Arc<dyn ContactRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { service_repo, contact_repo, appointment_repo, notifier }
    }

    async fn load_service(&self, tenant_id: &str, service_id: &str) -> Result<ServiceConfig, AppError> {
        self.service_repo
            .find_by_id(tenant_id, service_id)
            .await?
            .ok_or(AppError::Booking(BookingError::ServiceNotFound))
    }

    /// Open slots per business-local day. Lock-free; the reservation
    /// transaction re-validates whatever the client picks.
    pub async fn availability(
        &self,
        tenant_id: &str,
        service_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<(ServiceConfig, Vec<DayAvailability>), AppError> {
        let service = self.load_service(tenant_id, service_id).await?;
        if !service.is_active {
            return Err(BookingError::ServiceInactive.into());
        }

        let today = service.zone().local_date(now);
        let (first, last) = resolve_range(start, end, today)?;
        let (from, to) = fetch_window(first, last);
        let active = self.appointment_repo.list_active_in_range(&service.id, from, to).await?;

        let days = list_availability(&service, first, last, now, &active);
        Ok((service, days))
    }

    pub async fn book(&self, request: ReservationRequest) -> Result<Reservation, AppError> {
        request.contact.validate().map_err(AppError::Validation)?;

        let reservation = match self.appointment_repo.reserve(&request).await {
            Ok(r) => r,
            Err(AppError::Booking(BookingError::SlotUnavailable)) => {
                warn!(service_id = %request.service_id, start = %request.start, "Reservation lost slot race");
                return Err(BookingError::SlotUnavailable.into());
            }
            Err(e) => return Err(e),
        };

        let appointment = &reservation.appointment;
        info!(
            appointment_id = %appointment.id,
            service_id = %appointment.service_id,
            status = %appointment.status,
            "Appointment booked"
        );

        let notifier = self.notifier.clone();
        let contact = reservation.contact.clone();
        let booked = appointment.clone();
        self.spawn_notification("booked", &appointment.id, async move {
            let pending = booked.status == AppointmentStatus::PendingConfirmation;
            let client = if pending {
                notifier.notify_client_pending(&contact, &booked).await
            } else {
                notifier.notify_client_confirmed(&contact, &booked).await
            };
            if let Err(e) = client {
                warn!("Client notification failed: {}", e);
            }
            notifier.notify_contractor(&booked, pending).await
        });

        Ok(reservation)
    }

    pub async fn create_manual(&self, request: ManualAppointmentRequest) -> Result<Reservation, AppError> {
        request.contact.validate().map_err(AppError::Validation)?;
        let reservation = self.appointment_repo.create_manual(&request).await?;
        info!(appointment_id = %reservation.appointment.id, "Manual appointment created");
        Ok(reservation)
    }

    pub async fn get(&self, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
        self.appointment_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    pub async fn confirm(&self, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
        let confirmed = self.transition(tenant_id, id, StatusAction::Confirm, None).await?;
        info!(appointment_id = %confirmed.id, "Appointment confirmed");

        let notifier = self.notifier.clone();
        let contacts = self.contact_repo.clone();
        let appointment = confirmed.clone();
        self.spawn_notification("confirmed", &confirmed.id, async move {
            let contact = contacts
                .find_by_id(&appointment.tenant_id, &appointment.contact_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Contact for appointment".into()))?;
            notifier.notify_client_confirmed(&contact, &appointment).await
        });

        Ok(confirmed)
    }

    pub async fn decline(&self, tenant_id: &str, id: &str, reason: Option<String>) -> Result<Appointment, AppError> {
        let reason = reason.filter(|r| !r.trim().is_empty());
        let declined = self.transition(tenant_id, id, StatusAction::Decline, reason.as_deref()).await?;
        info!(appointment_id = %declined.id, "Appointment declined");

        let notifier = self.notifier.clone();
        let contacts = self.contact_repo.clone();
        let appointment = declined.clone();
        self.spawn_notification("declined", &declined.id, async move {
            let contact = contacts
                .find_by_id(&appointment.tenant_id, &appointment.contact_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Contact for appointment".into()))?;
            notifier.notify_client_declined(&contact, &appointment, reason.as_deref()).await
        });

        Ok(declined)
    }

    pub async fn start(&self, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
        self.transition(tenant_id, id, StatusAction::Start, None).await
    }

    pub async fn complete(&self, tenant_id: &str, id: &str) -> Result<Appointment, AppError> {
        self.transition(tenant_id, id, StatusAction::Complete, None).await
    }

    pub async fn cancel(&self, tenant_id: &str, id: &str, reason: Option<String>) -> Result<Appointment, AppError> {
        let reason = reason.filter(|r| !r.trim().is_empty());
        let cancelled = self.transition(tenant_id, id, StatusAction::Cancel, reason.as_deref()).await?;
        info!(appointment_id = %cancelled.id, "Appointment cancelled");
        Ok(cancelled)
    }

    async fn transition(
        &self,
        tenant_id: &str,
        id: &str,
        action: StatusAction,
        reason: Option<&str>,
    ) -> Result<Appointment, AppError> {
        let current = self.get(tenant_id, id).await?;
        let next = status_machine::apply(current.status, action)?;

        let notes = reason.map(|r| {
            let line = match action {
                StatusAction::Decline => format!("Declined: {}", r),
                _ => format!("Cancelled: {}", r),
            };
            Appointment::with_note(current.notes.as_deref(), &line)
        });

        // A concurrent transition moved the row first.
        self.appointment_repo
            .transition(tenant_id, id, current.status, next, notes)
            .await?
            .ok_or_else(|| AppError::InvalidTransition(format!(
                "appointment {} is no longer {}",
                id, current.status
            )))
    }

    fn spawn_notification<F>(&self, kind: &'static str, appointment_id: &str, job: F)
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let span = info_span!("notification", kind = kind, appointment_id = %appointment_id);
        tokio::spawn(
            async move {
                if let Err(e) = job.await {
                    warn!("Notification failed: {}", e);
                }
            }
            .instrument(span),
        );
    }
}
