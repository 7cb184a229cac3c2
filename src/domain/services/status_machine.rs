use crate::domain::models::appointment::AppointmentStatus;
use crate::error::AppError;

/// Contractor-driven lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Confirm,
    Decline,
    Start,
    Complete,
    Cancel,
}

impl StatusAction {
    pub fn name(&self) -> &'static str {
        match self {
            StatusAction::Confirm => "confirm",
            StatusAction::Decline => "decline",
            StatusAction::Start => "start",
            StatusAction::Complete => "complete",
            StatusAction::Cancel => "cancel",
        }
    }
}

pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
        (from, to),
        (PendingConfirmation, Scheduled)
            | (PendingConfirmation, Cancelled)
            | (Scheduled, InProgress)
            | (Scheduled, Cancelled)
            | (InProgress, Completed)
            | (InProgress, Cancelled)
    )
}

/// Target status of `action` applied to `current`, or `InvalidTransition`.
pub fn apply(current: AppointmentStatus, action: StatusAction) -> Result<AppointmentStatus, AppError> {
    use AppointmentStatus::*;
    let next = match (action, current) {
        (StatusAction::Confirm, PendingConfirmation) => Scheduled,
        (StatusAction::Decline, PendingConfirmation) => Cancelled,
        (StatusAction::Start, Scheduled) => InProgress,
        (StatusAction::Complete, InProgress) => Completed,
        (StatusAction::Cancel, status) if !status.is_terminal() => Cancelled,
        _ => {
            return Err(AppError::InvalidTransition(format!(
                "cannot {} an appointment that is {}",
                action.name(),
                current
            )));
        }
    };
    debug_assert!(can_transition(current, next));
    Ok(next)
}
