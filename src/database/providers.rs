// ABOUTME: Provider directory persistence: CRUD, listing, text search and rating counters
// ABOUTME: Cascading delete removes every row scoped to the provider in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::transactions::SqliteTransactionGuard;
use super::{format_timestamp, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{round_rating, NewProvider, Provider, ProviderCategory, WorkingHours};

/// Column list matching [`row_to_provider`]
pub(super) const PROVIDER_COLUMNS: &str = "id, name, description, address, phone, email, \
     latitude, longitude, category, working_hours, owner_id, is_active, is_visible, rating, \
     review_count, total_bookings, image_url, tags, created_at, updated_at";

impl Database {
    pub(super) async fn migrate_providers(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS providers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL,
                phone TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                category TEXT NOT NULL,
                working_hours TEXT NOT NULL,
                owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_visible INTEGER NOT NULL DEFAULT 1,
                rating REAL NOT NULL DEFAULT 0,
                review_count INTEGER NOT NULL DEFAULT 0,
                total_bookings INTEGER NOT NULL DEFAULT 0,
                image_url TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_providers_owner ON providers(owner_id)",
            "CREATE INDEX IF NOT EXISTS idx_providers_category ON providers(category)",
            "CREATE INDEX IF NOT EXISTS idx_providers_listed ON providers(is_active, is_visible)",
        ])
        .await
    }
}

/// Provider directory storage
pub struct ProviderManager {
    pool: SqlitePool,
}

impl ProviderManager {
    /// Create a new provider manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a provider owned by `owner_id`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_CONFLICT` when a provider with the same name and
    /// address already exists, or a database error
    pub async fn create(&self, owner_id: Uuid, input: NewProvider) -> AppResult<Provider> {
        let duplicates: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM providers WHERE LOWER(name) = LOWER($1) AND LOWER(address) = LOWER($2)",
        )
        .bind(input.name.trim())
        .bind(input.address.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check provider duplicates: {e}")))?;
        if duplicates > 0 {
            return Err(AppError::conflict(
                "A provider with this name and address already exists",
            ));
        }

        let now = Utc::now();
        let provider = Provider {
            id: Uuid::new_v4(),
            name: input.name.trim().to_owned(),
            description: input.description,
            address: input.address.trim().to_owned(),
            phone: input.phone,
            email: input.email,
            latitude: input.latitude,
            longitude: input.longitude,
            category: input.category,
            working_hours: input.working_hours,
            owner_id,
            is_active: true,
            is_visible: true,
            rating: 0.0,
            review_count: 0,
            total_bookings: 0,
            image_url: input.image_url,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO providers (
                id, name, description, address, phone, email, latitude, longitude,
                category, working_hours, owner_id, is_active, is_visible, rating,
                review_count, total_bookings, image_url, tags, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1, 1, 0, 0, 0, $12, $13, $14, $15)
            ",
        )
        .bind(provider.id.to_string())
        .bind(&provider.name)
        .bind(&provider.description)
        .bind(&provider.address)
        .bind(&provider.phone)
        .bind(&provider.email)
        .bind(provider.latitude)
        .bind(provider.longitude)
        .bind(provider.category.as_str())
        .bind(serde_json::to_string(&provider.working_hours)?)
        .bind(owner_id.to_string())
        .bind(&provider.image_url)
        .bind(serde_json::to_string(&provider.tags)?)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create provider: {e}")))?;

        info!(provider_id = %provider.id, owner_id = %owner_id, "Provider created");
        Ok(provider)
    }

    /// Get a provider by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, provider_id: Uuid) -> AppResult<Option<Provider>> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1");
        sqlx::query(&sql)
            .bind(provider_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get provider: {e}")))?
            .as_ref()
            .map(row_to_provider)
            .transpose()
    }

    /// Get a provider or fail with `RESOURCE_NOT_FOUND`
    ///
    /// # Errors
    ///
    /// Returns an error if the provider does not exist or the query fails
    pub async fn require(&self, provider_id: Uuid) -> AppResult<Provider> {
        self.get(provider_id).await?.ok_or_else(|| {
            AppError::not_found("Provider").with_resource_id(provider_id.to_string())
        })
    }

    /// Persist the editable fields of a provider
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(&self, provider: &Provider) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE providers
            SET name = $1, description = $2, address = $3, phone = $4, email = $5,
                latitude = $6, longitude = $7, working_hours = $8, image_url = $9,
                tags = $10, updated_at = $11
            WHERE id = $12
            ",
        )
        .bind(&provider.name)
        .bind(&provider.description)
        .bind(&provider.address)
        .bind(&provider.phone)
        .bind(&provider.email)
        .bind(provider.latitude)
        .bind(provider.longitude)
        .bind(serde_json::to_string(&provider.working_hours)?)
        .bind(&provider.image_url)
        .bind(serde_json::to_string(&provider.tags)?)
        .bind(format_timestamp(provider.updated_at))
        .bind(provider.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update provider: {e}")))?;
        Ok(())
    }

    /// Providers owned by a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Provider>> {
        let sql = format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE owner_id = $1 ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list owner providers: {e}")))?;
        rows.iter().map(row_to_provider).collect()
    }

    /// Active and visible providers in insertion order, optionally by category
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_listed(&self, category: Option<ProviderCategory>) -> AppResult<Vec<Provider>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE is_active = 1 AND is_visible = 1"
        ));
        if let Some(category) = category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        builder.push(" ORDER BY rowid");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list providers: {e}")))?;
        rows.iter().map(row_to_provider).collect()
    }

    /// Listed providers where every term prefixes some word of the name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search_by_name(&self, terms: &[String]) -> AppResult<Vec<Provider>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE is_active = 1 AND is_visible = 1"
        ));
        for term in terms {
            let escaped = escape_like(&term.to_lowercase());
            builder
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(format!("{escaped}%"))
                .push(r" ESCAPE '\' OR LOWER(name) LIKE ")
                .push_bind(format!("% {escaped}%"))
                .push(r" ESCAPE '\')");
        }
        builder.push(" ORDER BY rowid");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to search providers: {e}")))?;
        rows.iter().map(row_to_provider).collect()
    }

    /// Listed providers whose description or address contains `needle`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search_by_text(&self, needle: &str) -> AppResult<Vec<Provider>> {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        let sql = format!(
            r"
            SELECT {PROVIDER_COLUMNS} FROM providers
            WHERE is_active = 1 AND is_visible = 1
              AND (LOWER(description) LIKE $1 ESCAPE '\' OR LOWER(address) LIKE $1 ESCAPE '\')
            ORDER BY rowid
            "
        );
        let rows = sqlx::query(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to scan providers: {e}")))?;
        rows.iter().map(row_to_provider).collect()
    }

    /// Listed providers with at least one review, optionally by category
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_rated(&self, category: Option<ProviderCategory>) -> AppResult<Vec<Provider>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE is_active = 1 AND is_visible = 1 AND rating > 0"
        ));
        if let Some(category) = category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        builder.push(" ORDER BY rowid");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list rated providers: {e}")))?;
        rows.iter().map(row_to_provider).collect()
    }

    /// Every provider, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_all(&self, limit: u32) -> AppResult<Vec<Provider>> {
        let sql = format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers ORDER BY created_at DESC, rowid DESC LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list providers: {e}")))?;
        rows.iter().map(row_to_provider).collect()
    }

    /// Total number of providers
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM providers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count providers: {e}")))
    }

    /// Set the moderation flag
    ///
    /// # Errors
    ///
    /// Returns an error if the provider does not exist or the update fails
    pub async fn set_active(&self, provider_id: Uuid, is_active: bool) -> AppResult<Provider> {
        self.set_flag("is_active", provider_id, is_active).await
    }

    /// Set the listing flag
    ///
    /// # Errors
    ///
    /// Returns an error if the provider does not exist or the update fails
    pub async fn set_visible(&self, provider_id: Uuid, is_visible: bool) -> AppResult<Provider> {
        self.set_flag("is_visible", provider_id, is_visible).await
    }

    async fn set_flag(&self, column: &str, provider_id: Uuid, value: bool) -> AppResult<Provider> {
        let sql = format!("UPDATE providers SET {column} = $1, updated_at = $2 WHERE id = $3");
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(format_timestamp(Utc::now()))
            .bind(provider_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update provider {column}: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Provider").with_resource_id(provider_id.to_string()));
        }
        self.require(provider_id).await
    }

    /// Recompute rating, review count and booking total from source rows
    ///
    /// # Errors
    ///
    /// Returns an error if the provider does not exist or a query fails
    pub async fn recompute_stats(&self, provider_id: Uuid) -> AppResult<Provider> {
        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        recompute_rating(conn, provider_id).await?;
        sqlx::query(
            r"
            UPDATE providers
            SET total_bookings = (SELECT COUNT(*) FROM bookings WHERE provider_id = $1)
            WHERE id = $1
            ",
        )
        .bind(provider_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to recount bookings: {e}")))?;

        guard.commit().await?;
        self.require(provider_id).await
    }

    /// Delete a provider together with its services, bookings, reviews,
    /// promotions and provider-scoped loyalty rows
    ///
    /// When `allow_open_bookings` is false the delete is refused while a
    /// pending or confirmed booking exists.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_CONFLICT` for open bookings, `RESOURCE_NOT_FOUND`
    /// for an unknown provider, or a database error
    pub async fn delete_cascade(
        &self,
        provider_id: Uuid,
        allow_open_bookings: bool,
    ) -> AppResult<BTreeMap<String, u64>> {
        let id = provider_id.to_string();
        let mut guard = SqliteTransactionGuard::new(self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin transaction: {e}"))
        })?);
        let conn = guard.executor()?;

        if !allow_open_bookings {
            let open: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings WHERE provider_id = $1 AND status IN ('pending', 'confirmed')",
            )
            .bind(&id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to count open bookings: {e}")))?;
            if open > 0 {
                return Err(AppError::conflict(
                    "Provider has pending or confirmed bookings",
                ));
            }
        }

        let mut details = BTreeMap::new();
        for table in [
            "reviews",
            "promotions",
            "bookings",
            "services",
            "loyalty_transactions",
            "loyalty_accounts",
        ] {
            let sql = format!("DELETE FROM {table} WHERE provider_id = $1");
            let deleted = sqlx::query(&sql)
                .bind(&id)
                .execute(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete from {table}: {e}")))?
                .rows_affected();
            details.insert(table.to_owned(), deleted);
        }

        let deleted = sqlx::query("DELETE FROM providers WHERE id = $1")
            .bind(&id)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete provider: {e}")))?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::not_found("Provider").with_resource_id(id));
        }
        details.insert("providers".to_owned(), deleted);

        guard.commit().await?;
        info!(provider_id = %provider_id, "Provider deleted with dependents");
        Ok(details)
    }
}

// ================================================================
// Counter maintenance shared with bookings and reviews
// ================================================================

/// Overwrite `rating` and `review_count` with a full rescan of the reviews
pub(super) async fn recompute_rating(
    conn: &mut SqliteConnection,
    provider_id: Uuid,
) -> AppResult<(f64, i64)> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS review_count, AVG(rating) AS mean FROM reviews WHERE provider_id = $1",
    )
    .bind(provider_id.to_string())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to aggregate reviews: {e}")))?;

    let review_count: i64 = row.get("review_count");
    let mean: Option<f64> = row.get("mean");
    let rating = mean.map_or(0.0, round_rating);

    sqlx::query("UPDATE providers SET rating = $1, review_count = $2, updated_at = $3 WHERE id = $4")
        .bind(rating)
        .bind(review_count)
        .bind(format_timestamp(Utc::now()))
        .bind(provider_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update provider rating: {e}")))?;

    Ok((rating, review_count))
}

/// Bump the booking counter after a booking insert
pub(super) async fn increment_total_bookings(
    conn: &mut SqliteConnection,
    provider_id: Uuid,
) -> AppResult<()> {
    sqlx::query("UPDATE providers SET total_bookings = total_bookings + 1 WHERE id = $1")
        .bind(provider_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update booking counter: {e}")))?;
    Ok(())
}

fn escape_like(term: &str) -> String {
    term.replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

pub(super) fn row_to_provider(row: &SqliteRow) -> AppResult<Provider> {
    let id: String = row.get("id");
    let owner_id: String = row.get("owner_id");
    let category: String = row.get("category");
    let working_hours: String = row.get("working_hours");
    let tags: String = row.get("tags");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Provider {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        address: row.get("address"),
        phone: row.get("phone"),
        email: row.get("email"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        category: category.parse()?,
        working_hours: serde_json::from_str::<WorkingHours>(&working_hours)?,
        owner_id: parse_uuid(&owner_id)?,
        is_active: row.get("is_active"),
        is_visible: row.get("is_visible"),
        rating: row.get("rating"),
        review_count: row.get("review_count"),
        total_bookings: row.get("total_bookings"),
        image_url: row.get("image_url"),
        tags: serde_json::from_str(&tags)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
