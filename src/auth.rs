use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("password hashing failed: {}", e);
            AppError::Internal
        })
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn issue_token(user_id: &str, key: &EncodingKey) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, key).map_err(|e| {
        error!("token signing failed: {}", e);
        AppError::Internal
    })
}

/// The identity attached to every scoped request, extracted from the
/// `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".to_string()))?;
        let data = decode::<Claims>(token, &state.jwt_decoding_key, &Validation::default())
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
        Ok(AuthUser {
            user_id: data.claims.sub,
        })
    }
}
