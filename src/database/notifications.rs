// ABOUTME: Notification log persistence: append-only per-user messages with a read flag
// ABOUTME: insert_notification lets other managers append inside their own transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_optional_uuid, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{NewNotification, Notification};

impl Database {
    pub(super) async fn migrate_notifications(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                notification_type TEXT NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0,
                related_id TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read)",
        ])
        .await
    }
}

/// Append a notification on an open connection or transaction
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    draft: &NewNotification,
) -> AppResult<Notification> {
    let notification = Notification {
        id: Uuid::new_v4(),
        user_id: draft.user_id,
        title: draft.title.clone(),
        message: draft.message.clone(),
        notification_type: draft.notification_type,
        is_read: false,
        related_id: draft.related_id,
        created_at: Utc::now(),
    };

    sqlx::query(
        r"
        INSERT INTO notifications (id, user_id, title, message, notification_type, is_read, related_id, created_at)
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
        ",
    )
    .bind(notification.id.to_string())
    .bind(notification.user_id.to_string())
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.notification_type.as_str())
    .bind(notification.related_id.map(|id| id.to_string()))
    .bind(format_timestamp(notification.created_at))
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create notification: {e}")))?;

    Ok(notification)
}

/// Notification log storage
pub struct NotificationManager {
    pool: SqlitePool,
}

impl NotificationManager {
    /// Create a new notification manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a notification outside any transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, draft: &NewNotification) -> AppResult<Notification> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        insert_notification(&mut conn, draft).await
    }

    /// A user's notifications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, title, message, notification_type, is_read, related_id, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;
        rows.iter().map(row_to_notification).collect()
    }

    /// Number of unread notifications
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count notifications: {e}")))
    }

    /// Mark one of the user's notifications as read
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the notification is missing or
    /// belongs to someone else
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2")
                .bind(notification_id.to_string())
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to mark notification: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification")
                .with_resource_id(notification_id.to_string()));
        }
        Ok(())
    }

    /// Mark every notification of the user as read, returning how many changed
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to mark notifications: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Delete one of the user's notifications
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the notification is missing or
    /// belongs to someone else
    pub async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete notification: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification")
                .with_resource_id(notification_id.to_string()));
        }
        Ok(())
    }
}

fn row_to_notification(row: &SqliteRow) -> AppResult<Notification> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let notification_type: String = row.get("notification_type");
    let created_at: String = row.get("created_at");

    Ok(Notification {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        title: row.get("title"),
        message: row.get("message"),
        notification_type: notification_type.parse()?,
        is_read: row.get("is_read"),
        related_id: parse_optional_uuid(row.get("related_id"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
