use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::models::{
    appointment::{Appointment, AppointmentStatus},
    contact::{normalize_email, Contact, ContactInput, ContactResolution},
    reservation::{ManualAppointmentRequest, Reservation, ReservationRequest},
    service::ServiceConfig,
};
use crate::domain::ports::{AppointmentRepository, ContactRepository, ServiceRepository};
use crate::domain::services::reservation;
use crate::error::{AppError, BookingError};

#[derive(Default)]
struct MemoryState {
    services: HashMap<String, ServiceConfig>,
    contacts: HashMap<String, Contact>,
    appointments: HashMap<String, Appointment>,
}

impl MemoryState {
    fn service(&self, tenant_id: &str, id: &str) -> Option<ServiceConfig> {
        self.services.get(id).filter(|s| s.tenant_id == tenant_id).cloned()
    }

    fn active_in_range(&self, service_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.service_id == service_id && a.status.is_active() && a.overlaps(start, end))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        found
    }

    fn contact_by_email(&self, tenant_id: &str, email: &str) -> Option<Contact> {
        self.contacts
            .values()
            .find(|c| c.tenant_id == tenant_id && c.email.as_deref() == Some(email))
            .cloned()
    }

    fn resolve_contact(&self, tenant_id: &str, input: &ContactInput) -> Result<ContactResolution, AppError> {
        if let Some(id) = input.contact_id() {
            return self
                .contacts
                .get(id)
                .filter(|c| c.tenant_id == tenant_id)
                .cloned()
                .map(ContactResolution::Existing)
                .ok_or_else(|| reservation::contact_not_found(id));
        }
        if let Some(email) = input.normalized_email()
            && let Some(existing) = self.contact_by_email(tenant_id, &email) {
            return Ok(ContactResolution::Existing(existing));
        }
        reservation::new_contact(tenant_id, input).map(ContactResolution::Create)
    }

    fn commit(&mut self, resolution: ContactResolution, appointment: Appointment) -> Reservation {
        let contact = match resolution {
            ContactResolution::Existing(c) => c,
            ContactResolution::Create(c) => {
                self.contacts.insert(c.id.clone(), c.clone());
                c
            }
        };
        self.appointments.insert(appointment.id.clone(), appointment.clone());
        Reservation { appointment, contact }
    }
}

/// Process-local store behind one lock. Every write path holds the write
/// guard across check and insert, which serializes reservations.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn create(&self, service: &ServiceConfig) -> Result<ServiceConfig, AppError> {
        service.validate().map_err(AppError::Validation)?;
        let mut state = self.state.write().await;
        if state.services.contains_key(&service.id) {
            return Err(AppError::Conflict(format!("Service {} already exists", service.id)));
        }
        state.services.insert(service.id.clone(), service.clone());
        Ok(service.clone())
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<ServiceConfig>, AppError> {
        Ok(self.state.read().await.service(tenant_id, id))
    }

    async fn update(&self, service: &ServiceConfig) -> Result<ServiceConfig, AppError> {
        service.validate().map_err(AppError::Validation)?;
        let mut state = self.state.write().await;
        match state.services.get_mut(&service.id) {
            Some(existing) if existing.tenant_id == service.tenant_id => {
                *existing = service.clone();
                Ok(service.clone())
            }
            _ => Err(AppError::NotFound(format!("Service {} not found", service.id))),
        }
    }
}

#[async_trait]
impl ContactRepository for MemoryStore {
    async fn create(&self, contact: &Contact) -> Result<Contact, AppError> {
        let mut state = self.state.write().await;
        if let Some(email) = contact.email.as_deref()
            && state.contact_by_email(&contact.tenant_id, email).is_some() {
            return Err(AppError::Conflict(format!("Contact with email {} already exists", email)));
        }
        state.contacts.insert(contact.id.clone(), contact.clone());
        Ok(contact.clone())
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Contact>, AppError> {
        let state = self.state.read().await;
        Ok(state.contacts.get(id).filter(|c| c.tenant_id == tenant_id).cloned())
    }

    async fn find_by_email(&self, tenant_id: &str, email: &str) -> Result<Option<Contact>, AppError> {
        let state = self.state.read().await;
        Ok(normalize_email(email).and_then(|email| state.contact_by_email(tenant_id, &email)))
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        let state = self.state.read().await;
        Ok(state.appointments.get(id).filter(|a| a.tenant_id == tenant_id).cloned())
    }

    async fn list_active_in_range(&self, service_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError> {
        Ok(self.state.read().await.active_in_range(service_id, start, end))
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<Reservation, AppError> {
        let mut state = self.state.write().await;

        let service = state
            .service(&request.tenant_id, &request.service_id)
            .ok_or(BookingError::ServiceNotFound)?;
        let slot = reservation::admit(&service, request.start, request.now)?;
        let active = state.active_in_range(&service.id, slot.start, slot.end);
        reservation::ensure_capacity(&service, &slot, &active)?;

        let resolution = state.resolve_contact(&request.tenant_id, &request.contact)?;
        let appointment = reservation::public_appointment(&service, request, &resolution.contact().id);
        Ok(state.commit(resolution, appointment))
    }

    async fn create_manual(&self, request: &ManualAppointmentRequest) -> Result<Reservation, AppError> {
        let mut state = self.state.write().await;

        let service = state
            .service(&request.tenant_id, &request.service_id)
            .ok_or(BookingError::ServiceNotFound)?;
        let slot = reservation::slot_at(&service, request.start);
        let active = state.active_in_range(&service.id, slot.start, slot.end);
        reservation::ensure_no_conflict(&service, &slot, &active)?;

        let resolution = state.resolve_contact(&request.tenant_id, &request.contact)?;
        let appointment = reservation::manual_appointment(&service, request, &resolution.contact().id);
        Ok(state.commit(resolution, appointment))
    }

    async fn transition(
        &self,
        tenant_id: &str,
        id: &str,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Option<Appointment>, AppError> {
        let mut state = self.state.write().await;
        let Some(appointment) = state
            .appointments
            .get_mut(id)
            .filter(|a| a.tenant_id == tenant_id && a.status == expected)
        else {
            return Ok(None);
        };

        appointment.status = next;
        if notes.is_some() {
            appointment.notes = notes;
        }
        Ok(Some(appointment.clone()))
    }
}
