pub mod availability;
pub mod booking_rules;
pub mod booking_service;
pub mod calendar;
pub mod conflict;
pub mod reservation;
pub mod status_machine;
