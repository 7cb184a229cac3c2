use serde::Serialize;
use chrono::{DateTime, Utc};
use crate::domain::models::{appointment::Appointment, contact::{Contact, ContactInput}};

/// Everything the atomic reserve step needs; `now` is sampled right before
/// the store opens its transaction.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub tenant_id: String,
    pub service_id: String,
    pub start: DateTime<Utc>,
    pub contact: ContactInput,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub now: DateTime<Utc>,
}

/// Contractor-entered appointment; skips booking-window rules.
#[derive(Debug, Clone)]
pub struct ManualAppointmentRequest {
    pub tenant_id: String,
    pub service_id: String,
    pub start: DateTime<Utc>,
    pub contact: ContactInput,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// A committed booking together with the contact it was made for.
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub appointment: Appointment,
    pub contact: Contact,
}
