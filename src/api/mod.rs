//! API handlers for OptiField REST endpoints

pub mod dashboard;
pub mod equipment;
pub mod fuel_logs;
pub mod health;
pub mod interventions;
pub mod locations;
pub mod maintenance;
pub mod observations;
pub mod openapi;
pub mod parts;
pub mod realtime;
pub mod scan;
pub mod time_entries;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

impl AuthenticatedUser {
    /// Owner id applied to every row the caller reads or writes
    pub fn owner_id(&self) -> Uuid {
        self.0.user_id()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)?;

        Ok(AuthenticatedUser(claims))
    }
}
