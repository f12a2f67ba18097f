// ABOUTME: User account persistence
// ABOUTME: Registration insert, lookups by id and email, profile updates and admin listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, is_unique_violation, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{ProfileUpdate, User};

const USER_COLUMNS: &str = "id, email, password_hash, name, phone, created_at";

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT,
                phone TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at)",
        ])
        .await
    }
}

/// User account storage
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the email is taken
    pub async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(format_timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!("User with email {} already exists", user.email))
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;
        Ok(())
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?
            .as_ref()
            .map(row_to_user)
            .transpose()
    }

    /// Get a user by id or fail with `RESOURCE_NOT_FOUND`
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the query fails
    pub async fn require(&self, user_id: Uuid) -> AppResult<User> {
        self.get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_resource_id(user_id.to_string()))
    }

    /// Get a user by email, case-insensitive
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?
            .as_ref()
            .map(row_to_user)
            .transpose()
    }

    /// Update name and phone, returning the stored user
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let mut user = self.require(user_id).await?;
        if let Some(name) = update.name {
            user.name = Some(name);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }

        sqlx::query("UPDATE users SET name = $1, phone = $2 WHERE id = $3")
            .bind(&user.name)
            .bind(&user.phone)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update user profile: {e}")))?;
        Ok(user)
    }

    /// List users, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, limit: u32, offset: u32) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;
        rows.iter().map(row_to_user).collect()
    }

    /// Count users created at or after `since`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(format_timestamp(since))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recent users: {e}")))
    }

    /// Count users created in `[from, to)`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1 AND created_at < $2")
            .bind(format_timestamp(from))
            .bind(format_timestamp(to))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))
    }

    /// Total number of users
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))
    }
}

pub(super) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    Ok(User {
        id: parse_uuid(&id)?,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        phone: row.get("phone"),
        created_at: parse_timestamp(&created_at)?,
    })
}
