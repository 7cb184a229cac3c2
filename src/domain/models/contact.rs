use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Contact {
    pub id: String,
    pub tenant_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contact details as submitted with a booking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ContactInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl ContactInput {
    /// Lookup key for email-based reuse.
    pub fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().and_then(normalize_email)
    }

    /// Explicit contact id, if one was supplied.
    pub fn contact_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Shape checks only; whether a name is needed depends on resolution.
    pub fn validate(&self) -> Result<(), String> {
        if self.contact_id().is_none() && !self.has_name() && self.normalized_email().is_none() {
            return Err("contact requires an id, an email or a name".into());
        }
        if let Some(email) = self.email.as_deref()
            && !email.trim().is_empty()
            && !email.contains('@') {
            return Err("contact email is malformed".into());
        }
        Ok(())
    }
}

pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Splits on the first whitespace run: "Mary Ann Smith" -> ("Mary", "Ann Smith").
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

impl Contact {
    pub fn from_input(tenant_id: &str, input: &ContactInput) -> Self {
        let (first_name, last_name) = split_full_name(input.name.as_deref().unwrap_or_default());

        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            first_name,
            last_name,
            email: input.normalized_email(),
            phone: non_empty(&input.phone),
            company: non_empty(&input.company),
            notes: non_empty(&input.notes),
            created_at: Utc::now(),
        }
    }

    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Outcome of resolving a `ContactInput` against existing contacts.
pub enum ContactResolution {
    Existing(Contact),
    Create(Contact),
}

impl ContactResolution {
    pub fn contact(&self) -> &Contact {
        match self {
            ContactResolution::Existing(c) | ContactResolution::Create(c) => c,
        }
    }
}
