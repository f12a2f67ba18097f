// ABOUTME: Admin back-office models: roles with a strict level hierarchy and admin users
// ABOUTME: Also holds the daily system statistics snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Administrative role, ordered by [`AdminRole::level`]
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Read-mostly moderation
    Moderator,
    /// Full back-office access
    #[default]
    Admin,
    /// Destructive operations and admin management
    SuperAdmin,
}

impl AdminRole {
    /// Numeric level used for hierarchy checks
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Moderator => 1,
            Self::Admin => 2,
            Self::SuperAdmin => 3,
        }
    }

    /// Whether this role meets the required minimum
    #[must_use]
    pub const fn satisfies(&self, required: Self) -> bool {
        self.level() >= required.level()
    }

    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl Display for AdminRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(AppError::invalid_input(format!("Invalid admin role: {s}"))),
        }
    }
}

/// Back-office account linked to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    /// Admin record identifier
    pub id: Uuid,
    /// Linked user
    pub user_id: Uuid,
    /// Role
    pub role: AdminRole,
    /// Free-form permission tags
    pub permissions: Vec<String>,
    /// Disabled admins fail every check
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Request to register an admin
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdminUser {
    /// User to promote
    pub user_id: Uuid,
    /// Role to grant
    pub role: AdminRole,
    /// Permission tags
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Daily platform totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatsSnapshot {
    /// Snapshot identifier
    pub id: Uuid,
    /// Day, `YYYY-MM-DD`, unique
    pub date: String,
    /// Registered users
    pub total_users: i64,
    /// Providers
    pub total_providers: i64,
    /// Bookings
    pub total_bookings: i64,
    /// Revenue of completed bookings
    pub total_revenue: f64,
    /// Users with a booking in the last 30 days
    pub active_users: i64,
    /// Users created on `date`
    pub new_signups: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(AdminRole::SuperAdmin.satisfies(AdminRole::Admin));
        assert!(AdminRole::Admin.satisfies(AdminRole::Admin));
        assert!(AdminRole::Admin.satisfies(AdminRole::Moderator));
        assert!(!AdminRole::Moderator.satisfies(AdminRole::Admin));
        assert!(!AdminRole::Admin.satisfies(AdminRole::SuperAdmin));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
        assert!("root".parse::<AdminRole>().is_err());
    }
}
