// ABOUTME: Central admin authorization guard for routes requiring admin privileges
// ABOUTME: Checks the caller's admin record against a minimum role and returns 403 otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Admin Authorization Guard
//!
//! Every admin handler calls [`require_admin_role`] first. The caller must
//! have an active `admin_users` row whose role level is at least the
//! required one (moderator < admin < `super_admin`).
//!
//! ```rust,no_run
//! use salon_booking_server::database::Database;
//! use salon_booking_server::middleware::admin_guard::require_admin_role;
//! use salon_booking_server::models::AdminRole;
//!
//! # async fn example(db: &Database, user_id: uuid::Uuid) -> Result<(), salon_booking_server::errors::AppError> {
//! let admin = require_admin_role(user_id, AdminRole::Admin, db).await?;
//! println!("Admin {} authorized as {}", admin.user_id, admin.role);
//! # Ok(())
//! # }
//! ```

use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{AdminRole, AdminUser};

/// Require an active admin record with at least `required` role
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when the user is not an admin, is disabled or
/// has a lower role, or a database error
pub async fn require_admin_role(
    user_id: Uuid,
    required: AdminRole,
    database: &Database,
) -> AppResult<AdminUser> {
    let admin = database.admin().get_by_user(user_id).await?;

    match admin {
        Some(admin) if admin.is_active && admin.role.satisfies(required) => Ok(admin),
        Some(admin) => {
            AppLogger::log_security_event(
                "admin_role_insufficient",
                &format!("has {}, requires {required}", admin.role),
                Some(&user_id.to_string()),
            );
            Err(AppError::permission_denied(format!(
                "{required} privileges required"
            )))
        }
        None => Err(AppError::permission_denied("Admin privileges required")),
    }
}

/// Require the default `admin` role
///
/// # Errors
///
/// Same as [`require_admin_role`]
pub async fn require_admin(user_id: Uuid, database: &Database) -> AppResult<AdminUser> {
    require_admin_role(user_id, AdminRole::Admin, database).await
}
