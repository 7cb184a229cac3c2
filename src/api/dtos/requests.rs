use serde::Deserialize;
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::models::contact::ContactInput;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct BookRequest {
    #[serde(alias = "startTime")]
    pub start_time: DateTime<Utc>,
    pub contact: ContactInput,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(alias = "serviceId")]
    pub service_id: String,
    #[serde(alias = "startTime")]
    pub start_time: DateTime<Utc>,
    pub contact: ContactInput,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}
