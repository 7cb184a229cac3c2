use crate::domain::{models::contact::{normalize_email, Contact}, ports::ContactRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteContactRepo {
    pool: SqlitePool,
}

impl SqliteContactRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepo {
    async fn create(&self, contact: &Contact) -> Result<Contact, AppError> {
        sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (id, tenant_id, first_name, last_name, email, phone, company, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&contact.id).bind(&contact.tenant_id).bind(&contact.first_name).bind(&contact.last_name)
            .bind(&contact.email).bind(&contact.phone).bind(&contact.company).bind(&contact.notes)
            .bind(contact.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Contact>, AppError> {
        sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, tenant_id: &str, email: &str) -> Result<Option<Contact>, AppError> {
        let Some(email) = normalize_email(email) else { return Ok(None) };
        sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE tenant_id = ? AND email = ?")
            .bind(tenant_id).bind(email)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
