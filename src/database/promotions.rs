// ABOUTME: Promotion persistence: date-bounded provider discounts
// ABOUTME: Owner CRUD plus the public query for promotions running today
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{NewPromotion, Promotion};

const PROMOTION_COLUMNS: &str = "id, provider_id, title, description, discount_type, \
     discount_value, valid_from, valid_until, usage_limit, used_count, is_active, created_at";

impl Database {
    pub(super) async fn migrate_promotions(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS promotions (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES providers(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                discount_type TEXT NOT NULL,
                discount_value REAL NOT NULL CHECK (discount_value > 0),
                valid_from TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                usage_limit INTEGER,
                used_count INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_promotions_provider ON promotions(provider_id, is_active)",
        ])
        .await
    }
}

/// Promotion storage
pub struct PromotionManager {
    pool: SqlitePool,
}

impl PromotionManager {
    /// Create a new promotion manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an active promotion with no redemptions
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, provider_id: Uuid, input: NewPromotion) -> AppResult<Promotion> {
        let promotion = Promotion {
            id: Uuid::new_v4(),
            provider_id,
            title: input.title.trim().to_owned(),
            description: input.description,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            usage_limit: input.usage_limit,
            used_count: 0,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO promotions (
                id, provider_id, title, description, discount_type, discount_value,
                valid_from, valid_until, usage_limit, used_count, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 1, $10)
            ",
        )
        .bind(promotion.id.to_string())
        .bind(provider_id.to_string())
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(promotion.discount_type.as_str())
        .bind(promotion.discount_value)
        .bind(&promotion.valid_from)
        .bind(&promotion.valid_until)
        .bind(promotion.usage_limit)
        .bind(format_timestamp(promotion.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create promotion: {e}")))?;

        Ok(promotion)
    }

    /// Get a promotion or fail with `RESOURCE_NOT_FOUND`
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion does not exist or the query fails
    pub async fn require(&self, promotion_id: Uuid) -> AppResult<Promotion> {
        let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = $1");
        sqlx::query(&sql)
            .bind(promotion_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get promotion: {e}")))?
            .as_ref()
            .map(row_to_promotion)
            .transpose()?
            .ok_or_else(|| {
                AppError::not_found("Promotion").with_resource_id(promotion_id.to_string())
            })
    }

    /// Every promotion of a provider, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_provider(&self, provider_id: Uuid) -> AppResult<Vec<Promotion>> {
        let sql = format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE provider_id = $1 ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(provider_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list promotions: {e}")))?;
        rows.iter().map(row_to_promotion).collect()
    }

    /// Active promotions whose window contains `today`, optionally for one provider
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn running_on(
        &self,
        today: &str,
        provider_id: Option<Uuid>,
    ) -> AppResult<Vec<Promotion>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE is_active = 1 AND valid_from <= "
        ));
        builder
            .push_bind(today.to_owned())
            .push(" AND valid_until >= ")
            .push_bind(today.to_owned());
        if let Some(provider_id) = provider_id {
            builder
                .push(" AND provider_id = ")
                .push_bind(provider_id.to_string());
        }
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list active promotions: {e}")))?;
        rows.iter().map(row_to_promotion).collect()
    }

    /// Persist the editable fields of a promotion
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(&self, promotion: &Promotion) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE promotions
            SET title = $1, description = $2, discount_value = $3, valid_until = $4, is_active = $5
            WHERE id = $6
            ",
        )
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(promotion.discount_value)
        .bind(&promotion.valid_until)
        .bind(promotion.is_active)
        .bind(promotion.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update promotion: {e}")))?;
        Ok(())
    }

    /// Delete a promotion
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when it does not exist
    pub async fn delete(&self, promotion_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(promotion_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete promotion: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Promotion").with_resource_id(promotion_id.to_string()));
        }
        Ok(())
    }
}

fn row_to_promotion(row: &SqliteRow) -> AppResult<Promotion> {
    let id: String = row.get("id");
    let provider_id: String = row.get("provider_id");
    let discount_type: String = row.get("discount_type");
    let created_at: String = row.get("created_at");

    Ok(Promotion {
        id: parse_uuid(&id)?,
        provider_id: parse_uuid(&provider_id)?,
        title: row.get("title"),
        description: row.get("description"),
        discount_type: discount_type.parse()?,
        discount_value: row.get("discount_value"),
        valid_from: row.get("valid_from"),
        valid_until: row.get("valid_until"),
        usage_limit: row.get("usage_limit"),
        used_count: row.get("used_count"),
        is_active: row.get("is_active"),
        created_at: parse_timestamp(&created_at)?,
    })
}
