pub mod memory_store;

pub mod sqlite_appointment_repo;
pub mod sqlite_contact_repo;
pub mod sqlite_service_repo;

pub mod postgres_appointment_repo;
pub mod postgres_contact_repo;
pub mod postgres_service_repo;
