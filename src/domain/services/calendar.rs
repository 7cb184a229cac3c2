use crate::domain::models::appointment::Appointment;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a confirmed appointment
pub fn generate_ics(service_name: &str, appointment: &Appointment) -> String {
    let mut calendar = Calendar::new();

    let mut ical_event = IcalEvent::new();
    ical_event
        .summary(service_name)
        .starts(appointment.start_time)
        .ends(appointment.end_time)
        .uid(&appointment.id);

    if let Some(location) = appointment.location.as_deref() {
        ical_event.location(location);
    }
    if let Some(notes) = appointment.notes.as_deref() {
        ical_event.description(notes);
    }

    calendar.push(ical_event.done());
    calendar.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::appointment::{AppointmentStatus, NewAppointmentParams};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ics_carries_uid_and_location() {
        let appt = Appointment::new(NewAppointmentParams {
            tenant_id: "t1".into(),
            service_id: "s1".into(),
            contact_id: "c1".into(),
            start: Utc.with_ymd_and_hms(2030, 1, 7, 17, 0, 0).unwrap(),
            duration_minutes: 60,
            status: AppointmentStatus::Scheduled,
            location: Some("42 Oak Ave".into()),
            notes: None,
        });
        let ics = generate_ics("Roof inspection", &appt);
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains(&appt.id));
        assert!(ics.contains("Roof inspection"));
        assert!(ics.contains("42 Oak Ave"));
    }
}
