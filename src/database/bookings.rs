// ABOUTME: Booking workflow persistence: slot-safe creation, status transitions and cancellation
// ABOUTME: Every mutation appends its notification inside the same transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! # Booking Workflow
//!
//! Creation runs the slot check, the insert, the provider counter bump and the
//! owner notification in one transaction. The partial unique index
//! `idx_bookings_open_slot` guarantees that at most one pending or confirmed
//! booking exists per `(provider_id, date, time)` even when two writers race;
//! the loser's insert fails and is reported as a slot conflict.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::notifications::insert_notification;
use super::providers::{increment_total_bookings, row_to_provider, PROVIDER_COLUMNS};
use super::services::{row_to_service, SERVICE_COLUMNS};
use super::transactions::{retry_transaction, SqliteTransactionGuard};
use super::{
    format_timestamp, is_unique_violation, parse_timestamp, parse_uuid, Database,
};
use crate::constants::limits::TRANSACTION_MAX_RETRIES;
use crate::constants::notification_titles;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{
    Booking, BookingStatus, BookingStatusUpdate, NewBooking, NewNotification, NotificationType,
    Provider, Service,
};

/// Column list matching [`row_to_booking`]
pub(super) const BOOKING_COLUMNS: &str = "id, provider_id, service_id, user_id, date, time, status, \
     total_price, custom_price, notes, provider_notes, rejection_reason, created_at, updated_at";

const SLOT_TAKEN: &str = "Time slot is already booked";

impl Database {
    pub(super) async fn migrate_bookings(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES providers(id) ON DELETE CASCADE,
                service_id TEXT NOT NULL,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                total_price REAL NOT NULL,
                custom_price REAL,
                notes TEXT,
                provider_notes TEXT,
                rejection_reason TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_open_slot
            ON bookings(provider_id, date, time)
            WHERE status IN ('pending', 'confirmed')
            ",
            "CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings(user_id, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_bookings_provider ON bookings(provider_id, status)",
            "CREATE INDEX IF NOT EXISTS idx_bookings_service ON bookings(service_id)",
        ])
        .await
    }
}

/// Booking workflow storage
pub struct BookingManager {
    pool: SqlitePool,
}

impl BookingManager {
    /// Create a new booking manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================================================
    // Mutations
    // ================================================================

    /// Book a slot for a customer
    ///
    /// Retried on lock contention only; a retry that finds the slot taken
    /// reports the conflict.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for malformed date/time or an unbookable
    /// service, `RESOURCE_NOT_FOUND` for unknown provider or service,
    /// `RESOURCE_CONFLICT` when the slot is taken
    pub async fn create(&self, user_id: Uuid, input: &NewBooking) -> AppResult<Booking> {
        input.validate()?;
        let booking = retry_transaction(
            || self.try_create(user_id, input),
            TRANSACTION_MAX_RETRIES,
        )
        .await?;

        AppLogger::log_booking_event(
            &booking.id.to_string(),
            &user_id.to_string(),
            "none",
            booking.status.as_str(),
        );
        Ok(booking)
    }

    async fn try_create(&self, user_id: Uuid, input: &NewBooking) -> AppResult<Booking> {
        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        let service = fetch_service(conn, input.service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        let provider = fetch_provider(conn, input.provider_id)
            .await?
            .ok_or_else(|| AppError::not_found("Provider"))?;

        if service.provider_id != provider.id {
            return Err(AppError::invalid_input(
                "Service does not belong to this provider",
            ));
        }
        if !service.is_active {
            return Err(AppError::invalid_input("Service is not available"));
        }
        if !provider.is_active {
            return Err(AppError::invalid_input("Provider is not accepting bookings"));
        }

        let taken: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM bookings
            WHERE provider_id = $1 AND date = $2 AND time = $3
              AND status IN ('pending', 'confirmed')
            ",
        )
        .bind(provider.id.to_string())
        .bind(&input.date)
        .bind(&input.time)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to check slot: {e}")))?;
        if taken > 0 {
            return Err(AppError::conflict(SLOT_TAKEN));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            provider_id: provider.id,
            service_id: service.id,
            user_id,
            date: input.date.clone(),
            time: input.time.clone(),
            status: BookingStatus::Pending,
            total_price: service.price,
            custom_price: None,
            notes: input.notes.clone(),
            provider_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO bookings (
                id, provider_id, service_id, user_id, date, time, status,
                total_price, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(booking.id.to_string())
        .bind(booking.provider_id.to_string())
        .bind(booking.service_id.to_string())
        .bind(user_id.to_string())
        .bind(&booking.date)
        .bind(&booking.time)
        .bind(booking.status.as_str())
        .bind(booking.total_price)
        .bind(&booking.notes)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(SLOT_TAKEN)
            } else {
                AppError::database(format!("Failed to create booking: {e}"))
            }
        })?;

        increment_total_bookings(conn, provider.id).await?;

        let draft = NewNotification::new(
            provider.owner_id,
            NotificationType::BookingConfirmed,
            notification_titles::NEW_BOOKING,
            format!(
                "You have a new booking on {} at {}",
                booking.date, booking.time
            ),
        )
        .related_to(booking.id);
        insert_notification(conn, &draft).await?;

        guard.commit().await?;
        Ok(booking)
    }

    /// Provider owner moves a booking along the status machine
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` when the actor does not own the provider,
    /// `RESOURCE_CONFLICT` for an illegal transition, `INVALID_INPUT` for a
    /// `pending` target or bad price
    pub async fn update_status(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        update: BookingStatusUpdate,
    ) -> AppResult<Booking> {
        update.validate()?;

        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        let mut booking = fetch_booking(conn, booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking").with_resource_id(booking_id.to_string()))?;
        let owner_id = fetch_owner_id(conn, booking.provider_id).await?;
        if owner_id != Some(actor_id) {
            return Err(AppError::permission_denied(
                "Only the provider owner can update this booking",
            ));
        }

        let previous = booking.status;
        if !previous.can_transition_to(update.status) {
            return Err(AppError::conflict(format!(
                "Cannot change booking status from {previous} to {}",
                update.status
            )));
        }

        booking.status = update.status;
        if let Some(price) = update.custom_price {
            booking.custom_price = Some(price);
            booking.total_price = price;
        }
        if update.provider_notes.is_some() {
            booking.provider_notes = update.provider_notes;
        }
        if update.rejection_reason.is_some() {
            booking.rejection_reason = update.rejection_reason;
        }
        booking.updated_at = Utc::now();

        let result = sqlx::query(
            r"
            UPDATE bookings
            SET status = $1, custom_price = $2, total_price = $3, provider_notes = $4,
                rejection_reason = $5, updated_at = $6
            WHERE id = $7 AND status = $8
            ",
        )
        .bind(booking.status.as_str())
        .bind(booking.custom_price)
        .bind(booking.total_price)
        .bind(&booking.provider_notes)
        .bind(&booking.rejection_reason)
        .bind(format_timestamp(booking.updated_at))
        .bind(booking_id.to_string())
        .bind(previous.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update booking status: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict("Booking was modified concurrently"));
        }

        if let Some(draft) = customer_notification(&booking) {
            insert_notification(conn, &draft).await?;
        }

        guard.commit().await?;
        AppLogger::log_booking_event(
            &booking_id.to_string(),
            &actor_id.to_string(),
            previous.as_str(),
            booking.status.as_str(),
        );
        Ok(booking)
    }

    /// Customer cancels their own pending booking
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` for someone else's booking and
    /// `RESOURCE_CONFLICT` unless the booking is pending
    pub async fn cancel(&self, user_id: Uuid, booking_id: Uuid) -> AppResult<Booking> {
        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        let mut booking = fetch_booking(conn, booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking").with_resource_id(booking_id.to_string()))?;
        if booking.user_id != user_id {
            return Err(AppError::permission_denied(
                "Only the customer can cancel this booking",
            ));
        }
        if booking.status != BookingStatus::Pending {
            return Err(AppError::conflict(format!(
                "Only pending bookings can be cancelled (current status: {})",
                booking.status
            )));
        }

        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        let result = sqlx::query(
            "UPDATE bookings SET status = 'cancelled', updated_at = $1 WHERE id = $2 AND status = 'pending'",
        )
        .bind(format_timestamp(booking.updated_at))
        .bind(booking_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to cancel booking: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict("Booking was modified concurrently"));
        }

        if let Some(owner_id) = fetch_owner_id(conn, booking.provider_id).await? {
            let draft = NewNotification::new(
                owner_id,
                NotificationType::System,
                notification_titles::BOOKING_CANCELLED,
                format!(
                    "A booking on {} at {} was cancelled by the customer",
                    booking.date, booking.time
                ),
            )
            .related_to(booking.id);
            insert_notification(conn, &draft).await?;
        }

        guard.commit().await?;
        AppLogger::log_booking_event(
            &booking_id.to_string(),
            &user_id.to_string(),
            BookingStatus::Pending.as_str(),
            BookingStatus::Cancelled.as_str(),
        );
        Ok(booking)
    }

    // ================================================================
    // Queries
    // ================================================================

    /// Get a booking by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        fetch_booking(&mut conn, booking_id).await
    }

    /// A customer's bookings, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list user bookings: {e}")))?;
        rows.iter().map(row_to_booking).collect()
    }

    /// A provider's bookings, newest first, optionally one status only
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_provider(
        &self,
        provider_id: Uuid,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE provider_id = "
        ));
        builder.push_bind(provider_id.to_string());
        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list provider bookings: {e}")))?;
        rows.iter().map(row_to_booking).collect()
    }

    /// Every booking, newest first, optionally one status only
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_all(
        &self,
        status: Option<BookingStatus>,
        limit: u32,
    ) -> AppResult<Vec<Booking>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings"));
        if let Some(status) = status {
            builder.push(" WHERE status = ").push_bind(status.as_str());
        }
        builder
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(i64::from(limit));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list bookings: {e}")))?;
        rows.iter().map(row_to_booking).collect()
    }

    /// A provider's bookings with `date` inside the optional inclusive range
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_in_range(
        &self,
        provider_id: Uuid,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> AppResult<Vec<Booking>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE provider_id = "
        ));
        builder.push_bind(provider_id.to_string());
        if let Some(start) = start_date {
            builder.push(" AND date >= ").push_bind(start.to_owned());
        }
        if let Some(end) = end_date {
            builder.push(" AND date <= ").push_bind(end.to_owned());
        }
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list bookings in range: {e}")))?;
        rows.iter().map(row_to_booking).collect()
    }

    /// Confirmed bookings on or after `from_date`, soonest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn upcoming_confirmed(
        &self,
        provider_id: Uuid,
        from_date: &str,
        limit: u32,
    ) -> AppResult<Vec<Booking>> {
        let sql = format!(
            r"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE provider_id = $1 AND status = 'confirmed' AND date >= $2
            ORDER BY date, time
            LIMIT $3
            "
        );
        let rows = sqlx::query(&sql)
            .bind(provider_id.to_string())
            .bind(from_date)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list upcoming bookings: {e}")))?;
        rows.iter().map(row_to_booking).collect()
    }

    /// Most recently created bookings platform-wide
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn recent(&self, limit: u32) -> AppResult<Vec<Booking>> {
        self.list_all(None, limit).await
    }

    // ================================================================
    // Aggregates
    // ================================================================

    /// Booking count per status, platform-wide or for one provider
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn status_counts(&self, provider_id: Option<Uuid>) -> AppResult<BTreeMap<String, i64>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT status, COUNT(*) AS total FROM bookings");
        if let Some(provider_id) = provider_id {
            builder
                .push(" WHERE provider_id = ")
                .push_bind(provider_id.to_string());
        }
        builder.push(" GROUP BY status");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count bookings by status: {e}")))?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("status"), row.get::<i64, _>("total")))
            .collect())
    }

    /// Number of bookings, platform-wide or for one provider
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count(&self, provider_id: Option<Uuid>) -> AppResult<i64> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM bookings");
        if let Some(provider_id) = provider_id {
            builder
                .push(" WHERE provider_id = ")
                .push_bind(provider_id.to_string());
        }
        builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count bookings: {e}")))
    }

    /// Number of bookings scheduled on `date`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_on_date(&self, provider_id: Option<Uuid>, date: &str) -> AppResult<i64> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM bookings WHERE date = ");
        builder.push_bind(date.to_owned());
        if let Some(provider_id) = provider_id {
            builder
                .push(" AND provider_id = ")
                .push_bind(provider_id.to_string());
        }
        builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count bookings on date: {e}")))
    }

    /// Sum of `total_price` over completed bookings dated on or after `from_date`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn completed_revenue(
        &self,
        provider_id: Option<Uuid>,
        from_date: Option<&str>,
    ) -> AppResult<f64> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT COALESCE(SUM(total_price), 0.0) FROM bookings WHERE status = 'completed'",
        );
        if let Some(provider_id) = provider_id {
            builder
                .push(" AND provider_id = ")
                .push_bind(provider_id.to_string());
        }
        if let Some(from) = from_date {
            builder.push(" AND date >= ").push_bind(from.to_owned());
        }
        builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to sum revenue: {e}")))
    }

    /// Distinct customers who created a booking since `since`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_active_users_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM bookings WHERE created_at >= $1")
            .bind(format_timestamp(since))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count active users: {e}")))
    }

    /// Providers with the most bookings, highest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn top_providers_by_count(&self, limit: u32) -> AppResult<Vec<(Uuid, i64)>> {
        let rows = sqlx::query(
            r"
            SELECT provider_id, COUNT(*) AS total
            FROM bookings
            GROUP BY provider_id
            ORDER BY total DESC, provider_id
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to rank providers: {e}")))?;

        rows.iter()
            .map(|row| {
                let provider_id: String = row.get("provider_id");
                Ok((parse_uuid(&provider_id)?, row.get("total")))
            })
            .collect()
    }
}

/// Customer-facing notification for a status change, if the target notifies
fn customer_notification(booking: &Booking) -> Option<NewNotification> {
    let (notification_type, title, message) = match booking.status {
        BookingStatus::Confirmed => {
            let mut message = format!(
                "Your booking on {} at {} has been confirmed",
                booking.date, booking.time
            );
            if let Some(price) = booking.custom_price {
                message.push_str(&format!(" at price {price}"));
            }
            (
                NotificationType::BookingConfirmed,
                notification_titles::BOOKING_CONFIRMED,
                message,
            )
        }
        BookingStatus::Rejected => {
            let mut message = format!(
                "Your booking on {} at {} was rejected",
                booking.date, booking.time
            );
            if let Some(reason) = &booking.rejection_reason {
                message.push_str(&format!(": {reason}"));
            }
            (
                NotificationType::BookingRejected,
                notification_titles::BOOKING_REJECTED,
                message,
            )
        }
        BookingStatus::Completed => (
            NotificationType::BookingConfirmed,
            notification_titles::SERVICE_COMPLETED,
            "Your service has been completed, you can now rate your experience".to_owned(),
        ),
        _ => return None,
    };
    Some(NewNotification::new(booking.user_id, notification_type, title, message).related_to(booking.id))
}

async fn fetch_booking(conn: &mut SqliteConnection, booking_id: Uuid) -> AppResult<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
    sqlx::query(&sql)
        .bind(booking_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get booking: {e}")))?
        .as_ref()
        .map(row_to_booking)
        .transpose()
}

async fn fetch_service(conn: &mut SqliteConnection, service_id: Uuid) -> AppResult<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
    sqlx::query(&sql)
        .bind(service_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get service: {e}")))?
        .as_ref()
        .map(row_to_service)
        .transpose()
}

async fn fetch_provider(
    conn: &mut SqliteConnection,
    provider_id: Uuid,
) -> AppResult<Option<Provider>> {
    let sql = format!("SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1");
    sqlx::query(&sql)
        .bind(provider_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get provider: {e}")))?
        .as_ref()
        .map(row_to_provider)
        .transpose()
}

async fn fetch_owner_id(conn: &mut SqliteConnection, provider_id: Uuid) -> AppResult<Option<Uuid>> {
    let owner: Option<String> = sqlx::query_scalar("SELECT owner_id FROM providers WHERE id = $1")
        .bind(provider_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get provider owner: {e}")))?;
    owner.as_deref().map(parse_uuid).transpose()
}

pub(super) fn row_to_booking(row: &SqliteRow) -> AppResult<Booking> {
    let id: String = row.get("id");
    let provider_id: String = row.get("provider_id");
    let service_id: String = row.get("service_id");
    let user_id: String = row.get("user_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Booking {
        id: parse_uuid(&id)?,
        provider_id: parse_uuid(&provider_id)?,
        service_id: parse_uuid(&service_id)?,
        user_id: parse_uuid(&user_id)?,
        date: row.get("date"),
        time: row.get("time"),
        status: status.parse()?,
        total_price: row.get("total_price"),
        custom_price: row.get("custom_price"),
        notes: row.get("notes"),
        provider_notes: row.get("provider_notes"),
        rejection_reason: row.get("rejection_reason"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: "2025-06-01".to_owned(),
            time: "10:00".to_owned(),
            status,
            total_price: 25.0,
            custom_price: None,
            notes: None,
            provider_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_confirmation_mentions_custom_price() {
        let mut confirmed = booking(BookingStatus::Confirmed);
        confirmed.custom_price = Some(20.0);
        let draft = customer_notification(&confirmed).unwrap();
        assert_eq!(draft.title, "Booking confirmed");
        assert_eq!(
            draft.message,
            "Your booking on 2025-06-01 at 10:00 has been confirmed at price 20"
        );
        assert_eq!(draft.related_id, Some(confirmed.id));
    }

    #[test]
    fn test_rejection_appends_reason() {
        let mut rejected = booking(BookingStatus::Rejected);
        rejected.rejection_reason = Some("Fully booked".to_owned());
        let draft = customer_notification(&rejected).unwrap();
        assert_eq!(draft.notification_type, NotificationType::BookingRejected);
        assert!(draft.message.ends_with("was rejected: Fully booked"));
    }

    #[test]
    fn test_silent_targets() {
        assert!(customer_notification(&booking(BookingStatus::Cancelled)).is_none());
        assert!(customer_notification(&booking(BookingStatus::NoShow)).is_none());
    }

    #[test]
    fn test_completion_invites_a_review() {
        let completed = customer_notification(&booking(BookingStatus::Completed)).unwrap();
        assert_eq!(completed.notification_type, NotificationType::BookingConfirmed);
        assert_eq!(completed.title, notification_titles::SERVICE_COMPLETED);
        assert!(completed.message.contains("rate your experience"));
    }
}
