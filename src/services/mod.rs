// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Ownership checks, denormalized views, search pipeline, analytics and admin reporting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Domain service layer
//!
//! Route handlers stay thin: they authenticate, parse, call into this layer
//! and serialize. Everything that combines several managers or enforces an
//! ownership rule lives here.

/// Admin reporting, moderation toggles and snapshots
pub mod admin;
/// Provider analytics and owner dashboard
pub mod analytics;
/// Booking views with provider, service and customer snapshots
pub mod bookings;
/// Service catalog and promotions under provider ownership
pub mod catalog;
/// Loyalty point grants
pub mod loyalty;
/// Provider directory: search, ranking, details and owner CRUD
pub mod providers;
/// Review views
pub mod reviews;

use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AdminRole, Provider};

/// Load a provider and require `user_id` to own it
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown provider and
/// `PERMISSION_DENIED` for anyone but the owner
pub async fn ensure_provider_owner(
    database: &Database,
    provider_id: Uuid,
    user_id: Uuid,
) -> AppResult<Provider> {
    let provider = database.providers().require(provider_id).await?;
    if provider.owner_id != user_id {
        return Err(AppError::permission_denied(
            "Only the provider owner can perform this action",
        ));
    }
    Ok(provider)
}

/// Load a provider and require `user_id` to own it or be an active admin
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown provider and
/// `PERMISSION_DENIED` for anyone else
pub async fn ensure_owner_or_admin(
    database: &Database,
    provider_id: Uuid,
    user_id: Uuid,
) -> AppResult<Provider> {
    let provider = database.providers().require(provider_id).await?;
    if provider.owner_id == user_id {
        return Ok(provider);
    }
    match database.admin().get_by_user(user_id).await? {
        Some(admin) if admin.is_active && admin.role.satisfies(AdminRole::Admin) => Ok(provider),
        _ => Err(AppError::permission_denied(
            "Only the provider owner or an admin can perform this action",
        )),
    }
}
