// ABOUTME: Service catalog models scoped to a provider
// ABOUTME: Service record with price and duration plus create and update inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Bookable service offered by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Service identifier
    pub id: Uuid,
    /// Owning provider
    pub provider_id: Uuid,
    /// Service name
    pub name: String,
    /// Description
    pub description: String,
    /// Price, always positive
    pub price: f64,
    /// Duration in minutes, always positive
    pub duration_minutes: i64,
    /// Offered to customers
    pub is_active: bool,
    /// Optional sub-category
    pub category: Option<String>,
    /// Image
    pub image_url: Option<String>,
    /// Tags
    pub tags: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Input for creating a service
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    /// Service name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Price
    pub price: f64,
    /// Duration in minutes
    pub duration_minutes: i64,
    /// Defaults to active
    pub is_active: Option<bool>,
    /// Sub-category
    pub category: Option<String>,
    /// Image
    pub image_url: Option<String>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewService {
    /// Validate the new service
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name or non-positive price or duration
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Service name is required"));
        }
        validate_price(self.price)?;
        validate_duration(self.duration_minutes)
    }
}

/// Partial service update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceUpdate {
    /// Service name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Price
    pub price: Option<f64>,
    /// Duration in minutes
    pub duration_minutes: Option<i64>,
    /// Sub-category
    pub category: Option<String>,
    /// Active flag
    pub is_active: Option<bool>,
    /// Image
    pub image_url: Option<String>,
    /// Tags
    pub tags: Option<Vec<String>>,
}

impl ServiceUpdate {
    /// Apply present fields onto a service
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when an updated field fails validation
    pub fn apply_to(self, service: &mut Service) -> AppResult<()> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Service name cannot be empty"));
            }
            service.name = name;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
            service.price = price;
        }
        if let Some(duration) = self.duration_minutes {
            validate_duration(duration)?;
            service.duration_minutes = duration;
        }
        if let Some(category) = self.category {
            service.category = Some(category);
        }
        if let Some(is_active) = self.is_active {
            service.is_active = is_active;
        }
        if let Some(image_url) = self.image_url {
            service.image_url = Some(image_url);
        }
        if let Some(tags) = self.tags {
            service.tags = tags;
        }
        Ok(())
    }
}

fn validate_price(price: f64) -> AppResult<()> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input("Price must be greater than zero"))
    }
}

fn validate_duration(duration_minutes: i64) -> AppResult<()> {
    if duration_minutes > 0 {
        Ok(())
    } else {
        Err(AppError::invalid_input("Duration must be greater than zero"))
    }
}

/// Query for the cross-provider service search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSearchQuery {
    /// Text matched against service names
    #[serde(default)]
    pub q: String,
    /// Restrict to one provider
    pub provider_id: Option<Uuid>,
    /// Maximum price
    pub max_price: Option<f64>,
}
