// ABOUTME: Service catalog persistence scoped to providers
// ABOUTME: CRUD, per-provider listing, batch active-service fetch and cross-provider name search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{NewService, Service, ServiceSearchQuery};

/// Column list matching [`row_to_service`]
pub(super) const SERVICE_COLUMNS: &str = "id, provider_id, name, description, price, \
     duration_minutes, is_active, category, image_url, tags, created_at";

impl Database {
    pub(super) async fn migrate_services(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES providers(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price REAL NOT NULL CHECK (price > 0),
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                is_active INTEGER NOT NULL DEFAULT 1,
                category TEXT,
                image_url TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_services_provider ON services(provider_id, is_active)",
        ])
        .await
    }
}

/// Service catalog storage
pub struct ServiceManager {
    pool: SqlitePool,
}

impl ServiceManager {
    /// Create a new service manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a service for a provider
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, provider_id: Uuid, input: NewService) -> AppResult<Service> {
        let service = Service {
            id: Uuid::new_v4(),
            provider_id,
            name: input.name.trim().to_owned(),
            description: input.description,
            price: input.price,
            duration_minutes: input.duration_minutes,
            is_active: input.is_active.unwrap_or(true),
            category: input.category,
            image_url: input.image_url,
            tags: input.tags,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO services (
                id, provider_id, name, description, price, duration_minutes,
                is_active, category, image_url, tags, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(service.id.to_string())
        .bind(provider_id.to_string())
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.is_active)
        .bind(&service.category)
        .bind(&service.image_url)
        .bind(serde_json::to_string(&service.tags)?)
        .bind(format_timestamp(service.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create service: {e}")))?;

        Ok(service)
    }

    /// Get a service by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, service_id: Uuid) -> AppResult<Option<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        sqlx::query(&sql)
            .bind(service_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get service: {e}")))?
            .as_ref()
            .map(row_to_service)
            .transpose()
    }

    /// Get a service or fail with `RESOURCE_NOT_FOUND`
    ///
    /// # Errors
    ///
    /// Returns an error if the service does not exist or the query fails
    pub async fn require(&self, service_id: Uuid) -> AppResult<Service> {
        self.get(service_id).await?.ok_or_else(|| {
            AppError::not_found("Service").with_resource_id(service_id.to_string())
        })
    }

    /// Persist the editable fields of a service
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(&self, service: &Service) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE services
            SET name = $1, description = $2, price = $3, duration_minutes = $4,
                is_active = $5, category = $6, image_url = $7, tags = $8
            WHERE id = $9
            ",
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.is_active)
        .bind(&service.category)
        .bind(&service.image_url)
        .bind(serde_json::to_string(&service.tags)?)
        .bind(service.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update service: {e}")))?;
        Ok(())
    }

    /// Delete a service that no open booking references
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_CONFLICT` while pending or confirmed bookings use the
    /// service, `RESOURCE_NOT_FOUND` when it does not exist
    pub async fn delete(&self, service_id: Uuid) -> AppResult<()> {
        let id = service_id.to_string();
        let open: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE service_id = $1 AND status IN ('pending', 'confirmed')",
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count service bookings: {e}")))?;
        if open > 0 {
            return Err(AppError::conflict(
                "Service has pending or confirmed bookings",
            ));
        }

        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete service: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Service").with_resource_id(id));
        }
        Ok(())
    }

    /// Services of one provider, cheapest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_provider(
        &self,
        provider_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<Service>> {
        let filter = if include_inactive { "" } else { " AND is_active = 1" };
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE provider_id = $1{filter} ORDER BY price, rowid"
        );
        let rows = sqlx::query(&sql)
            .bind(provider_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list services: {e}")))?;
        rows.iter().map(row_to_service).collect()
    }

    /// Active services of many providers, grouped by provider
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn active_for_providers(
        &self,
        provider_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<Service>>> {
        let mut grouped: HashMap<Uuid, Vec<Service>> = HashMap::new();
        if provider_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active = 1 AND provider_id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in provider_ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(") ORDER BY price, rowid");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to batch fetch services: {e}")))?;
        for row in &rows {
            let service = row_to_service(row)?;
            grouped.entry(service.provider_id).or_default().push(service);
        }
        Ok(grouped)
    }

    /// Active services whose name contains the query text
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search(&self, query: &ServiceSearchQuery) -> AppResult<Vec<Service>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active = 1"
        ));
        let text = query.q.trim().to_lowercase();
        if !text.is_empty() {
            builder
                .push(" AND instr(LOWER(name), ")
                .push_bind(text)
                .push(") > 0");
        }
        if let Some(provider_id) = query.provider_id {
            builder
                .push(" AND provider_id = ")
                .push_bind(provider_id.to_string());
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        builder.push(" ORDER BY price, rowid");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to search services: {e}")))?;
        rows.iter().map(row_to_service).collect()
    }
}

pub(super) fn row_to_service(row: &SqliteRow) -> AppResult<Service> {
    let id: String = row.get("id");
    let provider_id: String = row.get("provider_id");
    let tags: String = row.get("tags");
    let created_at: String = row.get("created_at");

    Ok(Service {
        id: parse_uuid(&id)?,
        provider_id: parse_uuid(&provider_id)?,
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        duration_minutes: row.get("duration_minutes"),
        is_active: row.get("is_active"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        tags: serde_json::from_str(&tags)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
