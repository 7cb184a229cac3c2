use chrono::{DateTime, Duration, Timelike, Utc};
use crate::domain::models::service::{BusinessZone, ServiceConfig};
use crate::error::BookingError;

/// Booking-window policy: past, same-day, and advance-window checks, in that order.
pub fn check_booking_window(
    service: &ServiceConfig,
    zone: &BusinessZone,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    if start < now {
        return Err(BookingError::SlotInPast);
    }
    if !service.same_day_booking_allowed && zone.local_date(start) == zone.local_date(now) {
        return Err(BookingError::SameDayNotAllowed);
    }
    // An unrepresentable horizon lies beyond any `start`.
    let horizon = now.checked_add_signed(Duration::days(service.advance_booking_days as i64));
    if horizon.is_some_and(|limit| start > limit) {
        return Err(BookingError::SlotTooFarInAdvance);
    }
    Ok(())
}

/// The local interval `[start, start + duration)` must sit inside the
/// working window of the local day `start` falls on. Off-grid starts are fine.
pub fn check_working_hours(
    service: &ServiceConfig,
    zone: &BusinessZone,
    start: DateTime<Utc>,
) -> Result<(), BookingError> {
    let local = zone.local(start);
    let hours = service.hours_on(local.date());
    if !hours.is_working {
        return Err(BookingError::SlotOutsideWorkingHours);
    }

    // Only the earlier reading of a repeated (fall-back) local time is bookable.
    if zone.to_utc(&local) != Some(start) {
        return Err(BookingError::SlotOutsideWorkingHours);
    }

    let start_secs = local.time().num_seconds_from_midnight() as i64;
    let end_secs = start_secs + service.duration_minutes as i64 * 60;
    if start_secs < hours.start_minutes as i64 * 60 || end_secs > hours.end_minutes as i64 * 60 {
        return Err(BookingError::SlotOutsideWorkingHours);
    }
    Ok(())
}

/// Full public-path validation for a requested start time.
pub fn check_bookable(
    service: &ServiceConfig,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    if !service.is_active {
        return Err(BookingError::ServiceInactive);
    }
    let zone = service.zone();
    check_booking_window(service, &zone, start, now)?;
    check_working_hours(service, &zone, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::service::{NewServiceParams, WeeklyHours};
    use chrono::TimeZone;

    fn service() -> ServiceConfig {
        ServiceConfig::new(NewServiceParams {
            tenant_id: "t1".into(),
            name: "Gutter cleaning".into(),
            duration_minutes: 60,
            buffer_minutes: 15,
            working_hours: WeeklyHours::weekdays(9 * 60, 17 * 60),
            timezone: None,
            timezone_offset_hours: -8,
            advance_booking_days: 30,
            same_day_booking_allowed: false,
            max_concurrent_bookings_per_slot: 1,
            requires_confirmation: false,
        })
    }

    // Monday 2030-01-07 08:00 local (-08:00)
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, 16, 0, 0).unwrap()
    }

    #[test]
    fn past_start_rejected_first() {
        let s = service();
        let err = check_bookable(&s, now() - Duration::minutes(1), now()).unwrap_err();
        assert_eq!(err, BookingError::SlotInPast);
    }

    #[test]
    fn same_day_uses_business_local_date() {
        let s = service();
        // Monday 15:00 local == Monday 23:00 UTC, still "today" locally.
        let later_today = Utc.with_ymd_and_hms(2030, 1, 7, 23, 0, 0).unwrap();
        assert_eq!(check_bookable(&s, later_today, now()), Err(BookingError::SameDayNotAllowed));

        // Tuesday 09:00 local == Tuesday 17:00 UTC.
        let tomorrow = Utc.with_ymd_and_hms(2030, 1, 8, 17, 0, 0).unwrap();
        assert_eq!(check_bookable(&s, tomorrow, now()), Ok(()));
    }

    #[test]
    fn advance_window_is_inclusive_of_exact_limit() {
        let mut s = service();
        s.working_hours = sqlx::types::Json(WeeklyHours::every_day(0, 1440));
        let at_limit = now() + Duration::days(30);
        assert_eq!(check_bookable(&s, at_limit, now()), Ok(()));
        let beyond = now() + Duration::days(31);
        assert_eq!(check_bookable(&s, beyond, now()), Err(BookingError::SlotTooFarInAdvance));
    }

    #[test]
    fn working_hours_containment() {
        let s = service();
        let zone = s.zone();
        // Tuesday 16:00 local fits exactly, 16:01 spills past 17:00.
        let last = Utc.with_ymd_and_hms(2030, 1, 9, 0, 0, 0).unwrap();
        assert_eq!(check_working_hours(&s, &zone, last), Ok(()));
        let spill = last + Duration::minutes(1);
        assert_eq!(check_working_hours(&s, &zone, spill), Err(BookingError::SlotOutsideWorkingHours));
        // Off-grid start inside the window is accepted.
        let off_grid = Utc.with_ymd_and_hms(2030, 1, 8, 17, 50, 0).unwrap();
        assert_eq!(check_working_hours(&s, &zone, off_grid), Ok(()));
        // Saturday is closed.
        let saturday = Utc.with_ymd_and_hms(2030, 1, 12, 18, 0, 0).unwrap();
        assert_eq!(check_working_hours(&s, &zone, saturday), Err(BookingError::SlotOutsideWorkingHours));
    }

    #[test]
    fn oversized_advance_window_does_not_overflow() {
        let mut s = service();
        s.advance_booking_days = i32::MAX;
        let tomorrow = Utc.with_ymd_and_hms(2030, 1, 8, 17, 0, 0).unwrap();
        assert_eq!(check_bookable(&s, tomorrow, now()), Ok(()));
    }

    #[test]
    fn inactive_service_rejected_before_time_rules() {
        let mut s = service();
        s.is_active = false;
        assert_eq!(check_bookable(&s, now() - Duration::days(1), now()), Err(BookingError::ServiceInactive));
    }
}
