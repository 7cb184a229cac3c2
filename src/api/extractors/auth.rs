use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts},
};
use crate::error::AppError;
use crate::state::AppState;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

/// Caller presented the contractor API token.
pub struct ContractorAuth;

impl<S> FromRequestParts<S> for ContractorAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let token = parts.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        if token.is_empty() || !tokens_match(token, &app_state.config.admin_api_token) {
            warn!("Rejected contractor request with invalid token");
            return Err(AppError::Unauthorized);
        }

        Ok(ContractorAuth)
    }
}

/// Compares fixed-size digests so the time taken does not depend on how
/// much of the token matched.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.iter().zip(expected.iter()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
