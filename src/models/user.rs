//! Authenticated caller claims
//!
//! Tokens are issued by the identity provider; this server only verifies them.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// JWT claims carried by every API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User id, also the owner id of every row the user writes
    pub sub: Uuid,
    /// Farm the user is working for
    #[serde(default)]
    pub farm_id: Option<Uuid>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

impl UserClaims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Decode and validate a bearer token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, AppError> {
        decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }

    /// Sign the claims (used by tests and tooling)
    pub fn to_token(&self, secret: &str) -> Result<String, AppError> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}
