// ABOUTME: Promotion models: date-bounded discounts owned by a provider
// ABOUTME: Discount type enum, promotion record, create and update inputs with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::booking::validate_date;
use crate::errors::{AppError, AppResult};

/// How the discount value is applied
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percent off, at most 100
    Percentage,
    /// Fixed amount off
    Fixed,
}

impl DiscountType {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl Display for DiscountType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            _ => Err(AppError::invalid_input(format!("Invalid discount type: {s}"))),
        }
    }
}

/// Discount offered by a provider within a date window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion identifier
    pub id: Uuid,
    /// Owning provider
    pub provider_id: Uuid,
    /// Headline
    pub title: String,
    /// Description
    pub description: String,
    /// Discount kind
    pub discount_type: DiscountType,
    /// Discount amount or percent
    pub discount_value: f64,
    /// First valid day, `YYYY-MM-DD`
    pub valid_from: String,
    /// Last valid day, `YYYY-MM-DD`
    pub valid_until: String,
    /// Maximum redemptions
    pub usage_limit: Option<i64>,
    /// Redemptions so far
    pub used_count: i64,
    /// Enabled by the owner
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Active and inside its window on `today` (`YYYY-MM-DD`)
    #[must_use]
    pub fn is_running_on(&self, today: &str) -> bool {
        self.is_active && self.valid_from.as_str() <= today && today <= self.valid_until.as_str()
    }
}

/// Input for creating a promotion
#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    /// Headline
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Discount kind
    pub discount_type: DiscountType,
    /// Discount amount or percent
    pub discount_value: f64,
    /// First valid day
    pub valid_from: String,
    /// Last valid day
    pub valid_until: String,
    /// Maximum redemptions
    pub usage_limit: Option<i64>,
}

impl NewPromotion {
    /// Validate title, value and window
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` describing the first failed rule
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::invalid_input("Promotion title is required"));
        }
        validate_discount(self.discount_type, self.discount_value)?;
        validate_window(&self.valid_from, &self.valid_until)?;
        if matches!(self.usage_limit, Some(limit) if limit <= 0) {
            return Err(AppError::invalid_input("Usage limit must be positive"));
        }
        Ok(())
    }
}

/// Partial promotion update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionUpdate {
    /// Headline
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Discount amount or percent
    pub discount_value: Option<f64>,
    /// Last valid day
    pub valid_until: Option<String>,
    /// Enabled flag
    pub is_active: Option<bool>,
}

impl PromotionUpdate {
    /// Apply present fields onto a promotion
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the result would be invalid
    pub fn apply_to(self, promotion: &mut Promotion) -> AppResult<()> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(AppError::invalid_input("Promotion title cannot be empty"));
            }
            promotion.title = title;
        }
        if let Some(description) = self.description {
            promotion.description = description;
        }
        if let Some(value) = self.discount_value {
            validate_discount(promotion.discount_type, value)?;
            promotion.discount_value = value;
        }
        if let Some(valid_until) = self.valid_until {
            validate_window(&promotion.valid_from, &valid_until)?;
            promotion.valid_until = valid_until;
        }
        if let Some(is_active) = self.is_active {
            promotion.is_active = is_active;
        }
        Ok(())
    }
}

fn validate_discount(discount_type: DiscountType, value: f64) -> AppResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::invalid_input(
            "Discount value must be greater than zero",
        ));
    }
    if discount_type == DiscountType::Percentage && value > 100.0 {
        return Err(AppError::invalid_input(
            "Percentage discount cannot exceed 100",
        ));
    }
    Ok(())
}

fn validate_window(valid_from: &str, valid_until: &str) -> AppResult<()> {
    let from = validate_date(valid_from)?;
    let until = validate_date(valid_until)?;
    if from > until {
        return Err(AppError::invalid_input(
            "valid_from must not be after valid_until",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_promotion() -> NewPromotion {
        NewPromotion {
            title: "Summer".to_owned(),
            description: String::new(),
            discount_type: DiscountType::Percentage,
            discount_value: 20.0,
            valid_from: "2025-06-01".to_owned(),
            valid_until: "2025-06-30".to_owned(),
            usage_limit: None,
        }
    }

    #[test]
    fn test_promotion_validation() {
        assert!(new_promotion().validate().is_ok());

        let mut over = new_promotion();
        over.discount_value = 120.0;
        assert!(over.validate().is_err());

        let mut fixed = new_promotion();
        fixed.discount_type = DiscountType::Fixed;
        fixed.discount_value = 120.0;
        assert!(fixed.validate().is_ok());

        let mut inverted = new_promotion();
        inverted.valid_from = "2025-07-01".to_owned();
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_is_running_on() {
        let input = new_promotion();
        let promotion = Promotion {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            usage_limit: None,
            used_count: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(promotion.is_running_on("2025-06-01"));
        assert!(promotion.is_running_on("2025-06-30"));
        assert!(!promotion.is_running_on("2025-07-01"));
    }
}
