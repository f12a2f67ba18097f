// ABOUTME: Admin back-office persistence: admin users, daily statistics snapshots and bulk deletes
// ABOUTME: Bulk deletes run every table in one transaction and report per-table counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::warn;
use uuid::Uuid;

use super::transactions::SqliteTransactionGuard;
use super::{format_timestamp, is_unique_violation, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{AdminUser, NewAdminUser, SystemStatsSnapshot};

const ADMIN_COLUMNS: &str = "id, user_id, role, permissions, is_active, created_at";
const STATS_COLUMNS: &str = "id, date, total_users, total_providers, total_bookings, \
     total_revenue, active_users, new_signups, created_at";

impl Database {
    pub(super) async fn migrate_admin(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS admin_users (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                role TEXT NOT NULL DEFAULT 'admin',
                permissions TEXT NOT NULL DEFAULT '[]',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS system_stats (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL UNIQUE,
                total_users INTEGER NOT NULL,
                total_providers INTEGER NOT NULL,
                total_bookings INTEGER NOT NULL,
                total_revenue REAL NOT NULL,
                active_users INTEGER NOT NULL,
                new_signups INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        ])
        .await
    }
}

/// Outcome of a bulk delete
#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteReport {
    /// Headline count: providers for a provider purge, every row for a data purge
    pub deleted_count: u64,
    /// Rows removed per table
    pub details: BTreeMap<String, u64>,
}

/// Admin user, statistics and bulk delete storage
pub struct AdminManager {
    pool: SqlitePool,
}

impl AdminManager {
    /// Create a new admin manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================================================
    // Admin users
    // ================================================================

    /// Admin record linked to a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<AdminUser>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE user_id = $1");
        sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get admin user: {e}")))?
            .as_ref()
            .map(row_to_admin)
            .transpose()
    }

    /// Register a user as an admin
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_CONFLICT` when the user is already an admin
    pub async fn create(&self, input: NewAdminUser) -> AppResult<AdminUser> {
        let admin = AdminUser {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            role: input.role,
            permissions: input.permissions,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO admin_users (id, user_id, role, permissions, is_active, created_at)
            VALUES ($1, $2, $3, $4, 1, $5)
            ",
        )
        .bind(admin.id.to_string())
        .bind(admin.user_id.to_string())
        .bind(admin.role.as_str())
        .bind(serde_json::to_string(&admin.permissions)?)
        .bind(format_timestamp(admin.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("User is already an admin")
            } else {
                AppError::database(format!("Failed to create admin user: {e}"))
            }
        })?;

        Ok(admin)
    }

    // ================================================================
    // Statistics snapshots
    // ================================================================

    /// Snapshot for a day
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn snapshot_for(&self, date: &str) -> AppResult<Option<SystemStatsSnapshot>> {
        let sql = format!("SELECT {STATS_COLUMNS} FROM system_stats WHERE date = $1");
        sqlx::query(&sql)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get stats snapshot: {e}")))?
            .as_ref()
            .map(row_to_snapshot)
            .transpose()
    }

    /// Store a snapshot unless the day already has one; returns the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or read-back fails
    pub async fn save_snapshot(&self, snapshot: &SystemStatsSnapshot) -> AppResult<SystemStatsSnapshot> {
        sqlx::query(
            r"
            INSERT INTO system_stats (
                id, date, total_users, total_providers, total_bookings,
                total_revenue, active_users, new_signups, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT(date) DO NOTHING
            ",
        )
        .bind(snapshot.id.to_string())
        .bind(&snapshot.date)
        .bind(snapshot.total_users)
        .bind(snapshot.total_providers)
        .bind(snapshot.total_bookings)
        .bind(snapshot.total_revenue)
        .bind(snapshot.active_users)
        .bind(snapshot.new_signups)
        .bind(format_timestamp(snapshot.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save stats snapshot: {e}")))?;

        self.snapshot_for(&snapshot.date)
            .await?
            .ok_or_else(|| AppError::internal("Stats snapshot missing after insert"))
    }

    // ================================================================
    // Bulk deletes
    // ================================================================

    /// Delete every provider and everything scoped to one
    ///
    /// # Errors
    ///
    /// Returns a database error; nothing is deleted on failure
    pub async fn delete_all_providers(&self) -> AppResult<BulkDeleteReport> {
        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        let mut details = BTreeMap::new();
        for (table, filter) in [
            ("reviews", ""),
            ("promotions", ""),
            ("bookings", ""),
            ("services", ""),
            ("loyalty_transactions", " WHERE provider_id IS NOT NULL"),
            ("loyalty_accounts", " WHERE provider_id IS NOT NULL"),
            ("providers", ""),
        ] {
            let deleted = delete_rows(conn, table, filter).await?;
            details.insert(table.to_owned(), deleted);
        }

        guard.commit().await?;
        let deleted_count = details.get("providers").copied().unwrap_or_default();
        warn!(deleted_count, "All providers deleted");
        Ok(BulkDeleteReport {
            deleted_count,
            details,
        })
    }

    /// Delete all marketplace data, keeping users and admin users
    ///
    /// # Errors
    ///
    /// Returns a database error; nothing is deleted on failure
    pub async fn delete_all_data(&self) -> AppResult<BulkDeleteReport> {
        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        let mut details = BTreeMap::new();
        for table in [
            "reviews",
            "promotions",
            "bookings",
            "services",
            "providers",
            "notifications",
            "system_stats",
            "loyalty_transactions",
            "loyalty_accounts",
        ] {
            let deleted = delete_rows(conn, table, "").await?;
            details.insert(table.to_owned(), deleted);
        }

        guard.commit().await?;
        let deleted_count = details.values().sum();
        warn!(deleted_count, "All marketplace data deleted");
        Ok(BulkDeleteReport {
            deleted_count,
            details,
        })
    }
}

async fn delete_rows(conn: &mut SqliteConnection, table: &str, filter: &str) -> AppResult<u64> {
    let sql = format!("DELETE FROM {table}{filter}");
    sqlx::query(&sql)
        .execute(&mut *conn)
        .await
        .map(|result| result.rows_affected())
        .map_err(|e| AppError::database(format!("Failed to delete from {table}: {e}")))
}

fn row_to_admin(row: &SqliteRow) -> AppResult<AdminUser> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let role: String = row.get("role");
    let permissions: String = row.get("permissions");
    let created_at: String = row.get("created_at");

    Ok(AdminUser {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        role: role.parse()?,
        permissions: serde_json::from_str(&permissions)?,
        is_active: row.get("is_active"),
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_snapshot(row: &SqliteRow) -> AppResult<SystemStatsSnapshot> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");

    Ok(SystemStatsSnapshot {
        id: parse_uuid(&id)?,
        date: row.get("date"),
        total_users: row.get("total_users"),
        total_providers: row.get("total_providers"),
        total_bookings: row.get("total_bookings"),
        total_revenue: row.get("total_revenue"),
        active_users: row.get("active_users"),
        new_signups: row.get("new_signups"),
        created_at: parse_timestamp(&created_at)?,
    })
}
