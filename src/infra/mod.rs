pub mod email;
pub mod factory;
pub mod notify;
pub mod repositories;
