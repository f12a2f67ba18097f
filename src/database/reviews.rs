// ABOUTME: Review persistence with provider rating recomputation in the same transaction
// ABOUTME: One review per completed booking, enforced by checks and a unique index
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::providers::recompute_rating;
use super::transactions::SqliteTransactionGuard;
use super::{format_timestamp, is_unique_violation, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{BookingStatus, NewReview, Review};

const REVIEW_COLUMNS: &str = "id, provider_id, user_id, booking_id, rating, comment, created_at";
const ALREADY_REVIEWED: &str = "This booking has already been reviewed";

impl Database {
    pub(super) async fn migrate_reviews(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES providers(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                booking_id TEXT NOT NULL UNIQUE,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_reviews_provider ON reviews(provider_id, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id)",
        ])
        .await
    }
}

/// Review storage
pub struct ReviewManager {
    pool: SqlitePool,
}

impl ReviewManager {
    /// Create a new review manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a review for a completed booking and refresh the provider rating
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a bad rating or mismatched provider,
    /// `PERMISSION_DENIED` when the caller is not the booking's customer,
    /// `RESOURCE_CONFLICT` when the booking is not completed or already
    /// reviewed
    pub async fn create(&self, user_id: Uuid, input: NewReview) -> AppResult<Review> {
        input.validate()?;

        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        let booking = sqlx::query("SELECT user_id, provider_id, status FROM bookings WHERE id = $1")
            .bind(input.booking_id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to get booking: {e}")))?
            .ok_or_else(|| {
                AppError::not_found("Booking").with_resource_id(input.booking_id.to_string())
            })?;
        let booking_user: String = booking.get("user_id");
        let booking_provider: String = booking.get("provider_id");
        let status: BookingStatus = booking.get::<String, _>("status").parse()?;

        if parse_uuid(&booking_user)? != user_id {
            return Err(AppError::permission_denied(
                "Only the customer of this booking can review it",
            ));
        }
        if parse_uuid(&booking_provider)? != input.provider_id {
            return Err(AppError::invalid_input(
                "Booking does not belong to this provider",
            ));
        }
        if status != BookingStatus::Completed {
            return Err(AppError::conflict("Only completed bookings can be reviewed"));
        }

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE booking_id = $1")
            .bind(input.booking_id.to_string())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to check existing review: {e}")))?;
        if existing > 0 {
            return Err(AppError::conflict(ALREADY_REVIEWED));
        }

        let review = Review {
            id: Uuid::new_v4(),
            provider_id: input.provider_id,
            user_id,
            booking_id: input.booking_id,
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO reviews (id, provider_id, user_id, booking_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id.to_string())
        .bind(review.provider_id.to_string())
        .bind(user_id.to_string())
        .bind(review.booking_id.to_string())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(format_timestamp(review.created_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(ALREADY_REVIEWED)
            } else {
                AppError::database(format!("Failed to create review: {e}"))
            }
        })?;

        let (rating, review_count) = recompute_rating(conn, review.provider_id).await?;
        guard.commit().await?;

        info!(
            provider_id = %review.provider_id,
            rating = rating,
            review_count = review_count,
            "Review recorded"
        );
        Ok(review)
    }

    /// Latest reviews of a provider
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_provider(&self, provider_id: Uuid, limit: u32) -> AppResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE provider_id = $1 ORDER BY created_at DESC, rowid DESC LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(provider_id.to_string())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list provider reviews: {e}")))?;
        rows.iter().map(row_to_review).collect()
    }

    /// Reviews written by a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list user reviews: {e}")))?;
        rows.iter().map(row_to_review).collect()
    }

    /// Mean rating over reviews created in a booking date window, unrounded
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn average_for_bookings(
        &self,
        provider_id: Uuid,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> AppResult<Option<f64>> {
        sqlx::query_scalar(
            r"
            SELECT AVG(r.rating)
            FROM reviews r
            JOIN bookings b ON b.id = r.booking_id
            WHERE r.provider_id = $1
              AND ($2 IS NULL OR b.date >= $2)
              AND ($3 IS NULL OR b.date <= $3)
            ",
        )
        .bind(provider_id.to_string())
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to average ratings: {e}")))
    }
}

fn row_to_review(row: &SqliteRow) -> AppResult<Review> {
    let id: String = row.get("id");
    let provider_id: String = row.get("provider_id");
    let user_id: String = row.get("user_id");
    let booking_id: String = row.get("booking_id");
    let created_at: String = row.get("created_at");

    Ok(Review {
        id: parse_uuid(&id)?,
        provider_id: parse_uuid(&provider_id)?,
        user_id: parse_uuid(&user_id)?,
        booking_id: parse_uuid(&booking_id)?,
        rating: row.get("rating"),
        comment: row.get("comment"),
        created_at: parse_timestamp(&created_at)?,
    })
}
