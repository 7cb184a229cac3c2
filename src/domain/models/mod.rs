pub mod appointment;
pub mod contact;
pub mod service;
pub mod slot;
pub mod reservation;
