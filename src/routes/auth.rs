// ABOUTME: Account route handlers for registration, login and profile management
// ABOUTME: Issues JWT session tokens and never returns password hashes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Authentication routes
//!
//! Registration and login are public; both answer with a session token.
//! Profile routes require a bearer token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::authenticate;
use crate::auth::{hash_password, verify_password, SessionToken};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{ProfileUpdate, User, UserProfile};
use crate::resources::ServerResources;

const MIN_PASSWORD_LENGTH: usize = 8;

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Plain password, hashed before storage
    pub password: String,
    /// Display name
    pub name: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> AppResult<()> {
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(AppError::invalid_input("Invalid email format"));
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain password
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Authenticated user
    pub user: UserProfile,
    /// Session token
    #[serde(flatten)]
    pub session: SessionToken,
}

/// Account routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route(
                "/api/users/me",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        let user = User::new(&request.email, password_hash, request.name);
        resources.database.users().create(&user).await?;

        let session = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&user.id.to_string(), "register", true, None);

        let response = SessionResponse {
            user: UserProfile::from(user),
            session,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources.database.users().get_by_email(&request.email).await?;

        let Some(user) = user else {
            AppLogger::log_auth_event("unknown", "login", false, Some("unknown email"));
            return Err(AppError::auth_invalid("Invalid email or password"));
        };
        if !verify_password(&request.password, &user.password_hash)? {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("bad password"));
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let session = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);

        let response = SessionResponse {
            user: UserProfile::from(user),
            session,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/users/me
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let user = resources.database.users().require(auth.user_id).await?;
        Ok((StatusCode::OK, Json(UserProfile::from(user))).into_response())
    }

    /// Handle PUT /api/users/me
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(update): Json<ProfileUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let user = resources
            .database
            .users()
            .update_profile(auth.user_id, update)
            .await?;
        Ok((StatusCode::OK, Json(UserProfile::from(user))).into_response())
    }
}
