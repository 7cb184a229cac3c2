use std::sync::Arc;
use crate::domain::ports::{AppointmentRepository, ContactRepository, ServiceRepository};
use crate::domain::services::booking_service::BookingService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub contact_repo: Arc<dyn ContactRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub booking_service: Arc<BookingService>,
}
