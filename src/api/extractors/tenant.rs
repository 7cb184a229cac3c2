use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use std::collections::HashMap;
use tracing::Span;

/// `{tenant_id}` path segment, recorded on the request span.
pub struct TenantId(pub String);

impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let tenant_id = params
            .get("tenant_id")
            .filter(|id| !id.trim().is_empty())
            .ok_or(StatusCode::BAD_REQUEST)?;

        Span::current().record("tenant_id", tenant_id.as_str());
        Ok(TenantId(tenant_id.clone()))
    }
}
