use std::sync::Arc;
use async_trait::async_trait;
use serde_json::json;
use tera::{Context, Tera};
use tracing::{debug, info};

use crate::domain::{
    models::{appointment::Appointment, contact::Contact},
    ports::{EmailService, Notifier},
    services::calendar::generate_ics,
};
use crate::error::AppError;

const PENDING: &str = "client_pending.html";
const CONFIRMED: &str = "client_confirmed.html";
const DECLINED: &str = "client_declined.html";
const CONTRACTOR: &str = "contractor_new.html";

pub fn notification_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(PENDING, include_str!("../../templates/client_pending.html"))?;
    tera.add_raw_template(CONFIRMED, include_str!("../../templates/client_confirmed.html"))?;
    tera.add_raw_template(DECLINED, include_str!("../../templates/client_declined.html"))?;
    tera.add_raw_template(CONTRACTOR, include_str!("../../templates/contractor_new.html"))?;
    Ok(tera)
}

pub struct EmailNotifier {
    email_service: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    contractor_email: Option<String>,
}

impl EmailNotifier {
    pub fn new(email_service: Arc<dyn EmailService>, templates: Arc<Tera>, contractor_email: Option<String>) -> Self {
        Self { email_service, templates, contractor_email }
    }

    fn render(&self, template: &str, mut context: serde_json::Value, appointment: &Appointment) -> Result<String, AppError> {
        if let Some(map) = context.as_object_mut() {
            map.insert("appointment_id".into(), json!(appointment.id));
            map.insert("service_id".into(), json!(appointment.service_id));
            map.insert("start_time".into(), json!(appointment.start_time.format("%Y-%m-%d %H:%M UTC").to_string()));
            map.insert("end_time".into(), json!(appointment.end_time.format("%H:%M UTC").to_string()));
            map.insert("location".into(), json!(appointment.location));
            map.insert("notes".into(), json!(appointment.notes));
        }
        let context = Context::from_value(context)
            .map_err(|e| AppError::InternalWithMsg(format!("Template context error: {}", e)))?;
        self.templates
            .render(template, &context)
            .map_err(|e| AppError::InternalWithMsg(format!("Template render error ({}): {}", template, e)))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify_client_pending(&self, contact: &Contact, appointment: &Appointment) -> Result<(), AppError> {
        let Some(recipient) = contact.email.as_deref() else {
            debug!(contact_id = %contact.id, "Contact has no email, skipping pending notice");
            return Ok(());
        };
        let body = self.render(PENDING, json!({ "contact_name": contact.display_name() }), appointment)?;
        self.email_service.send(recipient, "Appointment request received", &body, None, None).await?;
        info!(appointment_id = %appointment.id, "Pending notice sent");
        Ok(())
    }

    async fn notify_client_confirmed(&self, contact: &Contact, appointment: &Appointment) -> Result<(), AppError> {
        let Some(recipient) = contact.email.as_deref() else {
            debug!(contact_id = %contact.id, "Contact has no email, skipping confirmation");
            return Ok(());
        };
        let body = self.render(CONFIRMED, json!({ "contact_name": contact.display_name() }), appointment)?;
        let ics = generate_ics("Service appointment", appointment);
        self.email_service
            .send(recipient, "Appointment confirmed", &body, Some("invite.ics"), Some(ics.as_bytes()))
            .await?;
        info!(appointment_id = %appointment.id, "Confirmation sent");
        Ok(())
    }

    async fn notify_client_declined(&self, contact: &Contact, appointment: &Appointment, reason: Option<&str>) -> Result<(), AppError> {
        let Some(recipient) = contact.email.as_deref() else {
            debug!(contact_id = %contact.id, "Contact has no email, skipping decline notice");
            return Ok(());
        };
        let context = json!({ "contact_name": contact.display_name(), "reason": reason });
        let body = self.render(DECLINED, context, appointment)?;
        self.email_service.send(recipient, "Appointment request declined", &body, None, None).await?;
        info!(appointment_id = %appointment.id, "Decline notice sent");
        Ok(())
    }

    async fn notify_contractor(&self, appointment: &Appointment, is_pending: bool) -> Result<(), AppError> {
        let Some(recipient) = self.contractor_email.as_deref() else {
            return Ok(());
        };
        let subject = if is_pending { "New appointment awaiting confirmation" } else { "New appointment booked" };
        let body = self.render(CONTRACTOR, json!({ "is_pending": is_pending }), appointment)?;
        self.email_service.send(recipient, subject, &body, None, None).await
    }
}
