use serde::Serialize;
use crate::domain::models::{
    appointment::Appointment,
    contact::Contact,
    reservation::Reservation,
    slot::DayAvailability,
};

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub service_id: String,
    pub duration_minutes: i32,
    pub days: Vec<DayAvailability>,
}

/// Appointment fields at top level, plus the resolved contact.
#[derive(Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub contact: Contact,
}

impl From<Reservation> for BookingResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            appointment: reservation.appointment,
            contact: reservation.contact,
        }
    }
}
