// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues HS256 session tokens, validates bearer headers, and hashes passwords with Argon2
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! # Authentication
//!
//! Every protected route resolves the caller through [`AuthManager::authenticate`],
//! which reads `Authorization: Bearer <jwt>` and returns the user id carried in
//! the token subject.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Authenticated caller resolved from a bearer token
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Email recorded in the token
    pub email: String,
}

/// Issued session token returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Signed `JWT`
    pub token: String,
    /// Expiry of the token
    pub expires_at: DateTime<Utc>,
}

/// Authentication manager for `JWT` tokens
#[derive(Clone)]
pub struct AuthManager {
    secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, token_expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            token_expiry_hours,
        }
    }

    /// Generate a signed HS256 `JWT` for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<SessionToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: service_names::API_AUDIENCE.to_owned(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;

        Ok(SessionToken { token, expires_at })
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` if the signature, audience or expiry check fails
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[service_names::API_AUDIENCE]);

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("JWT token validation failed: {e}");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AppError::auth_invalid("Token has expired"),
                    ErrorKind::InvalidSignature => {
                        AppError::auth_invalid("Token signature verification failed")
                    }
                    ErrorKind::InvalidAudience => AppError::auth_invalid("Token audience mismatch"),
                    _ => AppError::auth_invalid(format!("Token is malformed: {e}")),
                }
            })
    }

    /// Resolve the caller from the `Authorization` header
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` when no bearer token is present and
    /// `AUTH_INVALID` when the token does not validate
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let token = extract_bearer_token(headers)?.ok_or_else(AppError::auth_required)?;
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

        debug!(user_id = %user_id, "Authenticated request");
        Ok(AuthResult {
            user_id,
            email: claims.email,
        })
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid UTF-8"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map_or_else(
            || Err(AppError::auth_invalid("Authorization header must use Bearer scheme")),
            |token| Ok(Some(token)),
        )
}

/// Hash a password with Argon2id and a random salt
///
/// # Errors
///
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored PHC string
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::internal(format!("Stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generate a random 64-byte signing secret
#[must_use]
pub fn generate_jwt_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}
