// ABOUTME: SQLite database connection, schema migrations and shared row helpers
// ABOUTME: Hands out per-concern managers and batch fetch-by-id helpers for denormalized reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! # Database Management
//!
//! [`Database`] owns the `SQLite` pool. Each concern has its own manager
//! (`UserManager`, `BookingManager`, ...) wrapping a clone of the pool; the
//! schema for a concern is created by a `migrate_*` method in the same file.

/// Admin users, platform statistics and bulk deletes
pub mod admin;
/// Booking workflow
pub mod bookings;
/// Loyalty accounts and ledger
pub mod loyalty;
/// Notification log
pub mod notifications;
/// Promotions
pub mod promotions;
/// Provider directory
pub mod providers;
/// Reviews and rating aggregation
pub mod reviews;
/// Service catalog
pub mod services;
/// Transaction guard and retry helpers
pub mod transactions;
/// User accounts
pub mod users;

pub use admin::{AdminManager, BulkDeleteReport};
pub use bookings::BookingManager;
pub use loyalty::LoyaltyManager;
pub use notifications::NotificationManager;
pub use promotions::PromotionManager;
pub use providers::ProviderManager;
pub use reviews::ReviewManager;
pub use services::ServiceManager;
pub use transactions::{retry_transaction, SqliteTransactionGuard, TransactionGuard};
pub use users::UserManager;

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::constants::limits::SQLITE_BUSY_TIMEOUT_SECS;
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, Provider, Service, User};

/// Database handle shared by every request
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// File databases use WAL with a busy timeout. In-memory databases are
    /// pinned to a single long-lived connection so every query sees the
    /// same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS));
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(memory = is_memory, "Database ready");
        Ok(db)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create every table and index
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_providers().await?;
        self.migrate_services().await?;
        self.migrate_bookings().await?;
        self.migrate_reviews().await?;
        self.migrate_promotions().await?;
        self.migrate_notifications().await?;
        self.migrate_loyalty().await?;
        self.migrate_admin().await?;
        Ok(())
    }

    /// Run a list of DDL statements in order
    async fn execute_ddl(&self, statements: &[&str]) -> AppResult<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        Ok(())
    }

    /// User accounts
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Provider directory
    #[must_use]
    pub fn providers(&self) -> ProviderManager {
        ProviderManager::new(self.pool.clone())
    }

    /// Service catalog
    #[must_use]
    pub fn services(&self) -> ServiceManager {
        ServiceManager::new(self.pool.clone())
    }

    /// Booking workflow
    #[must_use]
    pub fn bookings(&self) -> BookingManager {
        BookingManager::new(self.pool.clone())
    }

    /// Reviews
    #[must_use]
    pub fn reviews(&self) -> ReviewManager {
        ReviewManager::new(self.pool.clone())
    }

    /// Loyalty ledger
    #[must_use]
    pub fn loyalty(&self) -> LoyaltyManager {
        LoyaltyManager::new(self.pool.clone())
    }

    /// Promotions
    #[must_use]
    pub fn promotions(&self) -> PromotionManager {
        PromotionManager::new(self.pool.clone())
    }

    /// Notifications
    #[must_use]
    pub fn notifications(&self) -> NotificationManager {
        NotificationManager::new(self.pool.clone())
    }

    /// Admin users, statistics and bulk deletes
    #[must_use]
    pub fn admin(&self) -> AdminManager {
        AdminManager::new(self.pool.clone())
    }

    // ================================================================
    // Batch fetch-by-id helpers
    // ================================================================

    /// Fetch users by id in one query
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, User>> {
        let rows = self
            .fetch_by_ids(
                "SELECT id, email, password_hash, name, phone, created_at FROM users",
                ids,
            )
            .await?;
        rows.iter()
            .map(users::row_to_user)
            .map(|user| user.map(|u| (u.id, u)))
            .collect()
    }

    /// Fetch providers by id in one query
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn providers_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Provider>> {
        let sql = format!("SELECT {} FROM providers", providers::PROVIDER_COLUMNS);
        let rows = self.fetch_by_ids(&sql, ids).await?;
        rows.iter()
            .map(providers::row_to_provider)
            .map(|provider| provider.map(|p| (p.id, p)))
            .collect()
    }

    /// Fetch services by id in one query
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn services_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Service>> {
        let sql = format!("SELECT {} FROM services", services::SERVICE_COLUMNS);
        let rows = self.fetch_by_ids(&sql, ids).await?;
        rows.iter()
            .map(services::row_to_service)
            .map(|service| service.map(|s| (s.id, s)))
            .collect()
    }

    /// Fetch bookings by id in one query
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn bookings_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Booking>> {
        let sql = format!("SELECT {} FROM bookings", bookings::BOOKING_COLUMNS);
        let rows = self.fetch_by_ids(&sql, ids).await?;
        rows.iter()
            .map(bookings::row_to_booking)
            .map(|booking| booking.map(|b| (b.id, b)))
            .collect()
    }

    async fn fetch_by_ids(
        &self,
        select: &str,
        ids: &[Uuid],
    ) -> AppResult<Vec<sqlx::sqlite::SqliteRow>> {
        let mut unique: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(select);
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in unique {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to batch fetch rows: {e}")))
    }
}

// ================================================================
// Row helpers shared by the managers
// ================================================================

/// Format a timestamp for storage: RFC 3339, UTC, microseconds
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns an internal error when the column is not RFC 3339
pub fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{value}': {e}")))
}

/// Parse a stored UUID
///
/// # Errors
///
/// Returns an internal error when the column is not a UUID
pub fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

/// Parse an optional stored UUID
///
/// # Errors
///
/// Returns an internal error when a present value is not a UUID
pub fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

/// Whether a sqlx error is a UNIQUE constraint violation
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Today's date in UTC, `YYYY-MM-DD`
#[must_use]
pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip_keeps_order() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::microseconds(1);
        let (a, b) = (format_timestamp(earlier), format_timestamp(later));
        assert!(a < b);
        assert_eq!(parse_timestamp(&a).unwrap().timestamp_micros(), earlier.timestamp_micros());
    }

    #[tokio::test]
    async fn test_memory_database_migrates_twice() {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        db.migrate().await.unwrap();
        assert!(db.users_by_ids(&[]).await.unwrap().is_empty());
    }
}
