use serde::{Deserialize, Serialize};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc, Weekday, Datelike};
use chrono_tz::Tz;
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

pub const MINUTES_PER_DAY: i32 = 1440;
pub const MAX_ADVANCE_BOOKING_DAYS: i32 = 3650;

/// Working window for one weekday, in minutes since local midnight.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayHours {
    pub is_working: bool,
    pub start_minutes: i32,
    pub end_minutes: i32,
}

impl DayHours {
    pub fn working(start_minutes: i32, end_minutes: i32) -> Self {
        Self { is_working: true, start_minutes, end_minutes }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

/// Seven entries, Sunday = 0 through Saturday = 6.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct WeeklyHours(pub [DayHours; 7]);

impl WeeklyHours {
    /// Same window Monday to Friday, weekend closed.
    pub fn weekdays(start_minutes: i32, end_minutes: i32) -> Self {
        let mut days = [DayHours::closed(); 7];
        for day in days.iter_mut().take(6).skip(1) {
            *day = DayHours::working(start_minutes, end_minutes);
        }
        Self(days)
    }

    pub fn every_day(start_minutes: i32, end_minutes: i32) -> Self {
        Self([DayHours::working(start_minutes, end_minutes); 7])
    }

    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        &self.0[weekday.num_days_from_sunday() as usize]
    }
}

/// Business-time clock of a service.
#[derive(Debug, Clone, Copy)]
pub enum BusinessZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl BusinessZone {
    /// Local wall-clock time to a UTC instant. `None` inside a DST gap;
    /// ambiguous times resolve to the earlier instant.
    pub fn to_utc(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            BusinessZone::Named(tz) => tz.from_local_datetime(local).earliest().map(|dt| dt.with_timezone(&Utc)),
            BusinessZone::Fixed(offset) => offset.from_local_datetime(local).earliest().map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            BusinessZone::Named(tz) => instant.with_timezone(tz).naive_local(),
            BusinessZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ServiceConfig {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_minutes: i32,
    pub working_hours: Json<WeeklyHours>,
    pub timezone: Option<String>,
    pub timezone_offset_hours: i32,
    pub advance_booking_days: i32,
    pub same_day_booking_allowed: bool,
    pub max_concurrent_bookings_per_slot: i32,
    pub requires_confirmation: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewServiceParams {
    pub tenant_id: String,
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_minutes: i32,
    pub working_hours: WeeklyHours,
    pub timezone: Option<String>,
    pub timezone_offset_hours: i32,
    pub advance_booking_days: i32,
    pub same_day_booking_allowed: bool,
    pub max_concurrent_bookings_per_slot: i32,
    pub requires_confirmation: bool,
}

impl ServiceConfig {
    pub fn new(params: NewServiceParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            name: params.name,
            duration_minutes: params.duration_minutes,
            buffer_minutes: params.buffer_minutes,
            working_hours: Json(params.working_hours),
            timezone: params.timezone,
            timezone_offset_hours: params.timezone_offset_hours,
            advance_booking_days: params.advance_booking_days,
            same_day_booking_allowed: params.same_day_booking_allowed,
            max_concurrent_bookings_per_slot: params.max_concurrent_bookings_per_slot,
            requires_confirmation: params.requires_confirmation,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// IANA zone if configured and valid, else the legacy whole-hour offset.
    pub fn zone(&self) -> BusinessZone {
        if let Some(name) = self.timezone.as_deref()
            && let Ok(tz) = name.parse::<Tz>() {
            return BusinessZone::Named(tz);
        }
        let offset = FixedOffset::east_opt(self.timezone_offset_hours * 3600)
            .unwrap_or(Utc.fix());
        BusinessZone::Fixed(offset)
    }

    pub fn hours_on(&self, date: NaiveDate) -> &DayHours {
        self.working_hours.0.for_weekday(date.weekday())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MINUTES_PER_DAY).contains(&self.duration_minutes) {
            return Err(format!("duration_minutes must be between 1 and {}", MINUTES_PER_DAY));
        }
        if !(0..=MINUTES_PER_DAY).contains(&self.buffer_minutes) {
            return Err(format!("buffer_minutes must be between 0 and {}", MINUTES_PER_DAY));
        }
        if !(0..=MAX_ADVANCE_BOOKING_DAYS).contains(&self.advance_booking_days) {
            return Err(format!("advance_booking_days must be between 0 and {}", MAX_ADVANCE_BOOKING_DAYS));
        }
        if self.max_concurrent_bookings_per_slot < 1 {
            return Err("max_concurrent_bookings_per_slot must be at least 1".into());
        }
        if !(-23..=23).contains(&self.timezone_offset_hours) {
            return Err("timezone_offset_hours out of range".into());
        }
        if let Some(name) = self.timezone.as_deref()
            && name.parse::<Tz>().is_err() {
            return Err(format!("Invalid timezone '{}'", name));
        }
        for day in self.working_hours.0.0.iter().filter(|d| d.is_working) {
            if day.start_minutes < 0 || day.end_minutes > MINUTES_PER_DAY {
                return Err("working hours must lie within the day".into());
            }
            if day.start_minutes >= day.end_minutes {
                return Err("working day must start before it ends".into());
            }
        }
        Ok(())
    }
}
