use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Bearer token guarding contractor endpoints.
    pub admin_api_token: String,
    pub mail_service_url: Option<String>,
    pub mail_service_token: String,
    pub mail_from_alias: String,
    pub contractor_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "memory://".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            admin_api_token: env::var("ADMIN_API_TOKEN").expect("ADMIN_API_TOKEN must be set"),
            mail_service_url: env::var("MAIL_SERVICE_URL").ok().filter(|v| !v.trim().is_empty()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_default(),
            mail_from_alias: env::var("MAIL_FROM_ALIAS").unwrap_or_else(|_| "bookings".to_string()),
            contractor_email: env::var("CONTRACTOR_EMAIL").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// In-memory store, log notifier; for tests and local runs.
    pub fn in_memory(admin_api_token: &str) -> Self {
        Self {
            database_url: "memory://".to_string(),
            port: 0,
            admin_api_token: admin_api_token.to_string(),
            mail_service_url: None,
            mail_service_token: String::new(),
            mail_from_alias: "bookings".to_string(),
            contractor_email: None,
        }
    }
}
