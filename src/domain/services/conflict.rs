use crate::domain::models::{appointment::Appointment, slot::Slot};

/// Active appointments whose interval overlaps `slot` (half-open).
pub fn overlapping<'a>(active: &'a [Appointment], slot: &'a Slot) -> impl Iterator<Item = &'a Appointment> + 'a {
    active
        .iter()
        .filter(|a| a.status.is_active())
        .filter(move |a| a.overlaps(slot.start, slot.end))
}

pub fn count_overlapping(active: &[Appointment], slot: &Slot) -> usize {
    overlapping(active, slot).count()
}

pub fn is_available(active: &[Appointment], slot: &Slot, max_concurrent: i32) -> bool {
    (count_overlapping(active, slot) as i64) < max_concurrent as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::appointment::{AppointmentStatus, NewAppointmentParams};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
    }

    fn booked(start: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment::new(NewAppointmentParams {
            tenant_id: "t1".into(),
            service_id: "s1".into(),
            contact_id: "c1".into(),
            start,
            duration_minutes: 60,
            status,
            location: None,
            notes: None,
        })
    }

    fn slot(start: DateTime<Utc>) -> Slot {
        Slot::new(start, start + Duration::minutes(60))
    }

    #[test]
    fn back_to_back_is_free() {
        let active = vec![booked(at(9, 0), AppointmentStatus::Scheduled)];
        assert_eq!(count_overlapping(&active, &slot(at(10, 0))), 0);
        assert_eq!(count_overlapping(&active, &slot(at(8, 0))), 0);
        assert!(is_available(&active, &slot(at(10, 0)), 1));
    }

    #[test]
    fn ten_minute_overlap_counts() {
        let active = vec![booked(at(9, 0), AppointmentStatus::PendingConfirmation)];
        assert_eq!(count_overlapping(&active, &slot(at(9, 50))), 1);
        assert!(!is_available(&active, &slot(at(9, 50)), 1));
        assert!(is_available(&active, &slot(at(9, 50)), 2));
    }

    #[test]
    fn inactive_appointments_are_ignored() {
        let active = vec![
            booked(at(9, 0), AppointmentStatus::Cancelled),
            booked(at(9, 0), AppointmentStatus::Completed),
            booked(at(9, 0), AppointmentStatus::InProgress),
        ];
        assert_eq!(count_overlapping(&active, &slot(at(9, 30))), 1);
    }

    #[test]
    fn overlapping_yields_colliding_ids() {
        let a = booked(at(9, 0), AppointmentStatus::Scheduled);
        let b = booked(at(11, 0), AppointmentStatus::Scheduled);
        let active = vec![a.clone(), b];
        let wide = Slot::new(at(8, 0), at(10, 30));
        let ids: Vec<_> = overlapping(&active, &wide).map(|x| x.id.clone()).collect();
        assert_eq!(ids, vec![a.id]);
    }
}
