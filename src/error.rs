use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Terminal failures of the public booking path. None are retried here;
/// the caller re-fetches availability and picks another slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Service not found")]
    ServiceNotFound,
    #[error("Service is not accepting bookings")]
    ServiceInactive,
    #[error("Selected slot is in the past")]
    SlotInPast,
    #[error("Selected slot is outside working hours")]
    SlotOutsideWorkingHours,
    #[error("Selected slot is too far in advance")]
    SlotTooFarInAdvance,
    #[error("Same-day booking is not allowed for this service")]
    SameDayNotAllowed,
    #[error("Selected slot is no longer available")]
    SlotUnavailable,
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::ServiceNotFound => "SERVICE_NOT_FOUND",
            BookingError::ServiceInactive => "SERVICE_INACTIVE",
            BookingError::SlotInPast => "SLOT_IN_PAST",
            BookingError::SlotOutsideWorkingHours => "SLOT_OUTSIDE_WORKING_HOURS",
            BookingError::SlotTooFarInAdvance => "SLOT_TOO_FAR_IN_ADVANCE",
            BookingError::SameDayNotAllowed => "SAME_DAY_NOT_ALLOWED",
            BookingError::SlotUnavailable => "SLOT_UNAVAILABLE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            BookingError::ServiceNotFound => StatusCode::NOT_FOUND,
            BookingError::SlotUnavailable => StatusCode::CONFLICT,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn booking(&self) -> Option<&BookingError> {
        match self {
            AppError::Booking(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "DUPLICATE" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized".to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg.clone()),
            AppError::Booking(e) => (e.status(), e.code(), e.to_string()),
            AppError::InvalidTransition(msg) => (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_errors_map_to_status_codes() {
        let unavailable = AppError::Booking(BookingError::SlotUnavailable).into_response();
        assert_eq!(unavailable.status(), StatusCode::CONFLICT);

        let past = AppError::Booking(BookingError::SlotInPast).into_response();
        assert_eq!(past.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = AppError::Booking(BookingError::ServiceNotFound).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let transition = AppError::InvalidTransition("x".into()).into_response();
        assert_eq!(transition.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn booking_error_exposes_code() {
        let err: AppError = BookingError::SlotTooFarInAdvance.into();
        assert_eq!(err.booking().map(BookingError::code), Some("SLOT_TOO_FAR_IN_ADVANCE"));
    }
}
