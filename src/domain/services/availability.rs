use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use crate::domain::models::{
    appointment::Appointment,
    service::{BusinessZone, ServiceConfig},
    slot::{DayAvailability, Slot},
};
use crate::domain::services::{booking_rules::check_booking_window, conflict::is_available};
use crate::error::AppError;

pub const DEFAULT_RANGE_DAYS: u64 = 13;
pub const MAX_RANGE_DAYS: i64 = 62;
/// Requested dates further than this from today are refused outright.
pub const MAX_DISTANCE_FROM_TODAY_DAYS: i64 = 3700;

/// Grid of candidate slots for one local day, before policy filtering.
fn day_candidates(service: &ServiceConfig, zone: BusinessZone, date: NaiveDate) -> impl Iterator<Item = Slot> + use<> {
    let hours = *service.hours_on(date);
    let duration = service.duration_minutes;
    let step = (duration as i64 + service.buffer_minutes as i64).max(1) as usize;
    let last_start = if hours.is_working && duration > 0 { hours.end_minutes - duration } else { -1 };
    let midnight = date.and_time(NaiveTime::MIN);

    (hours.start_minutes..=last_start)
        .step_by(step)
        .filter_map(move |minute| zone.to_utc(&(midnight + Duration::minutes(minute as i64))))
        .map(move |start| Slot::new(start, start + Duration::minutes(duration as i64)))
}

/// Bookable candidates for one local day under the service's window policy.
pub fn slots_for_day(
    service: &ServiceConfig,
    zone: BusinessZone,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> impl Iterator<Item = Slot> + '_ {
    day_candidates(service, zone, date)
        .filter(move |slot| check_booking_window(service, &zone, slot.start, now).is_ok())
}

/// Lazily yields every slot from `max(range_start, today)` through `range_end`
/// (business-local dates, inclusive) in ascending order. Pure in its inputs.
pub fn generate_slots(
    service: &ServiceConfig,
    range_start: NaiveDate,
    range_end: NaiveDate,
    now: DateTime<Utc>,
) -> impl Iterator<Item = Slot> + '_ {
    let zone = service.zone();
    listed_days(&zone, range_start, range_end, now)
        .flat_map(move |date| slots_for_day(service, zone, date, now))
}

fn listed_days(zone: &BusinessZone, range_start: NaiveDate, range_end: NaiveDate, now: DateTime<Utc>) -> impl Iterator<Item = NaiveDate> + use<> {
    let first = range_start.max(zone.local_date(now));
    first.iter_days().take_while(move |date| *date <= range_end)
}

/// Open slots per day, filtered through the conflict detector.
pub fn list_availability(
    service: &ServiceConfig,
    range_start: NaiveDate,
    range_end: NaiveDate,
    now: DateTime<Utc>,
    active: &[Appointment],
) -> Vec<DayAvailability> {
    let zone = service.zone();
    let capacity = service.max_concurrent_bookings_per_slot;

    listed_days(&zone, range_start, range_end, now)
        .map(|date| DayAvailability {
            date,
            slots: slots_for_day(service, zone, date, now)
                .filter(|slot| is_available(active, slot, capacity))
                .collect(),
        })
        .collect()
}

/// Applies defaults and bounds to a requested listing range.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = start.unwrap_or(today);
    let end = match end {
        Some(end) => end,
        None => start
            .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
            .ok_or_else(|| AppError::Validation("start is out of range".into()))?,
    };

    for date in [start, end] {
        if date.signed_duration_since(today).num_days().abs() > MAX_DISTANCE_FROM_TODAY_DAYS {
            return Err(AppError::Validation(format!(
                "dates must lie within {} days of today",
                MAX_DISTANCE_FROM_TODAY_DAYS
            )));
        }
    }
    if end < start {
        return Err(AppError::Validation("end must not be before start".into()));
    }
    if (end - start).num_days() > MAX_RANGE_DAYS {
        return Err(AppError::Validation(format!("range may span at most {} days", MAX_RANGE_DAYS)));
    }
    Ok((start, end))
}

/// UTC window wide enough to cover the local days `[first, last]` under any offset.
pub fn fetch_window(first: NaiveDate, last: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = (first - Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
    let to = (last + Duration::days(2)).and_time(NaiveTime::MIN).and_utc();
    (from, to)
}
