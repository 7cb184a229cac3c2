use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    PendingConfirmation,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ACTIVE: [AppointmentStatus; 3] = [
        AppointmentStatus::PendingConfirmation,
        AppointmentStatus::Scheduled,
        AppointmentStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingConfirmation => "pending-confirmation",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::InProgress => "in-progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Counts toward slot capacity.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending-confirmation" => Ok(AppointmentStatus::PendingConfirmation),
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "in-progress" => Ok(AppointmentStatus::InProgress),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    pub service_id: String,
    pub contact_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: AppointmentStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewAppointmentParams {
    pub tenant_id: String,
    pub service_id: String,
    pub contact_id: String,
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams) -> Self {
        let end_time = params.start + Duration::minutes(params.duration_minutes as i64);

        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            service_id: params.service_id,
            contact_id: params.contact_id,
            start_time: params.start,
            end_time,
            status: params.status,
            location: params.location,
            notes: params.notes,
            created_at: Utc::now(),
        }
    }

    /// Half-open overlap: touching intervals do not collide.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && end > self.start_time
    }

    pub fn with_note(notes: Option<&str>, line: &str) -> String {
        match notes {
            Some(existing) if !existing.trim().is_empty() => format!("{}\n{}", existing, line),
            _ => line.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>) -> Appointment {
        Appointment::new(NewAppointmentParams {
            tenant_id: "t1".into(),
            service_id: "s1".into(),
            contact_id: "c1".into(),
            start,
            duration_minutes: 60,
            status: AppointmentStatus::Scheduled,
            location: None,
            notes: None,
        })
    }

    #[test]
    fn end_is_start_plus_duration() {
        let a = appointment(at(9, 0));
        assert_eq!(a.end_time, at(10, 0));
    }

    #[test]
    fn back_to_back_does_not_overlap() {
        let a = appointment(at(9, 0));
        assert!(!a.overlaps(at(10, 0), at(11, 0)));
        assert!(!a.overlaps(at(8, 0), at(9, 0)));
        assert!(a.overlaps(at(9, 50), at(10, 50)));
        assert!(a.overlaps(at(8, 0), at(12, 0)));
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            AppointmentStatus::PendingConfirmation,
            AppointmentStatus::Scheduled,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(AppointmentStatus::try_from(status.as_str().to_string()), Ok(status));
        }
        assert!(AppointmentStatus::try_from("CONFIRMED".to_string()).is_err());
    }

    #[test]
    fn only_live_statuses_are_active() {
        assert!(AppointmentStatus::PendingConfirmation.is_active());
        assert!(AppointmentStatus::InProgress.is_active());
        assert!(!AppointmentStatus::Completed.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&AppointmentStatus::PendingConfirmation).unwrap();
        assert_eq!(json, "\"pending-confirmation\"");
    }

    #[test]
    fn note_lines_are_appended() {
        assert_eq!(Appointment::with_note(None, "Declined"), "Declined");
        assert_eq!(Appointment::with_note(Some("Gate code 12"), "Declined"), "Gate code 12\nDeclined");
    }
}
