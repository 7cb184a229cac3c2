pub mod email_notifier;
pub mod log_notifier;
