// ABOUTME: User account models
// ABOUTME: Stored user record, public profile view and profile update input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user (customer, provider owner or admin)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Lowercased login email
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub name: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user with a fresh id
    #[must_use]
    pub fn new(email: &str, password_hash: String, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            name,
            phone: None,
            created_at: Utc::now(),
        }
    }
}

/// Public view of a user, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier
    pub id: Uuid,
    /// Login email
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Reviewer identity shown next to public reviews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerSummary {
    /// Reviewer name, `"User"` when unset
    pub name: String,
    /// First three characters of the email followed by `***`
    pub email: String,
}

impl From<&User> for ReviewerSummary {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone().unwrap_or_else(|| "User".to_owned()),
            email: mask_email(&user.email),
        }
    }
}

/// Keep the first three characters of an email and hide the rest
#[must_use]
pub fn mask_email(email: &str) -> String {
    let prefix: String = email.chars().take(3).collect();
    format!("{prefix}***")
}

/// Partial update of the caller's profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("sara@example.com"), "sar***");
        assert_eq!(mask_email("ab"), "ab***");
    }

    #[test]
    fn test_new_user_lowercases_email() {
        let user = User::new("  Sara@Example.COM ", "hash".to_owned(), None);
        assert_eq!(user.email, "sara@example.com");
    }
}
