//! Steps of the reservation transaction that do not touch storage. Each
//! store runs them, in order, inside its own atomic unit:
//! load service → [`admit`] → load active overlaps → [`ensure_capacity`]
//! → resolve contact → insert [`public_appointment`].

use chrono::{DateTime, Duration, Utc};
use crate::domain::models::{
    appointment::{Appointment, AppointmentStatus, NewAppointmentParams},
    contact::{Contact, ContactInput},
    reservation::{ManualAppointmentRequest, ReservationRequest},
    service::ServiceConfig,
    slot::Slot,
};
use crate::domain::services::{booking_rules::check_bookable, conflict};
use crate::error::{AppError, BookingError};

pub fn slot_at(service: &ServiceConfig, start: DateTime<Utc>) -> Slot {
    Slot::new(start, start + Duration::minutes(service.duration_minutes as i64))
}

/// Re-validates the requested start against the current clock and policy.
pub fn admit(service: &ServiceConfig, start: DateTime<Utc>, now: DateTime<Utc>) -> Result<Slot, BookingError> {
    check_bookable(service, start, now)?;
    Ok(slot_at(service, start))
}

pub fn ensure_capacity(service: &ServiceConfig, slot: &Slot, active: &[Appointment]) -> Result<(), BookingError> {
    if conflict::is_available(active, slot, service.max_concurrent_bookings_per_slot) {
        Ok(())
    } else {
        Err(BookingError::SlotUnavailable)
    }
}

/// Manual-path check; names the colliding appointments.
pub fn ensure_no_conflict(service: &ServiceConfig, slot: &Slot, active: &[Appointment]) -> Result<(), AppError> {
    if conflict::is_available(active, slot, service.max_concurrent_bookings_per_slot) {
        return Ok(());
    }
    let ids: Vec<&str> = conflict::overlapping(active, slot).map(|a| a.id.as_str()).collect();
    Err(AppError::Conflict(format!("Appointment overlaps existing appointment(s): {}", ids.join(", "))))
}

/// Contact to insert when neither id nor email matched an existing one.
pub fn new_contact(tenant_id: &str, input: &ContactInput) -> Result<Contact, AppError> {
    if !input.has_name() {
        return Err(AppError::Validation("contact name is required to create a new contact".into()));
    }
    Ok(Contact::from_input(tenant_id, input))
}

pub fn contact_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Contact {} not found", id))
}

pub fn initial_status(service: &ServiceConfig) -> AppointmentStatus {
    if service.requires_confirmation {
        AppointmentStatus::PendingConfirmation
    } else {
        AppointmentStatus::Scheduled
    }
}

pub fn public_appointment(service: &ServiceConfig, request: &ReservationRequest, contact_id: &str) -> Appointment {
    Appointment::new(NewAppointmentParams {
        tenant_id: request.tenant_id.clone(),
        service_id: service.id.clone(),
        contact_id: contact_id.to_string(),
        start: request.start,
        duration_minutes: service.duration_minutes,
        status: initial_status(service),
        location: request.location.clone(),
        notes: request.notes.clone(),
    })
}

pub fn manual_appointment(service: &ServiceConfig, request: &ManualAppointmentRequest, contact_id: &str) -> Appointment {
    Appointment::new(NewAppointmentParams {
        tenant_id: request.tenant_id.clone(),
        service_id: service.id.clone(),
        contact_id: contact_id.to_string(),
        start: request.start,
        duration_minutes: service.duration_minutes,
        status: AppointmentStatus::Scheduled,
        location: request.location.clone(),
        notes: request.notes.clone(),
    })
}
