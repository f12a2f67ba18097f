// ABOUTME: Provider directory models: salons and clinics with location, hours and rating counters
// ABOUTME: Includes the category enum, weekly working hours, create/update inputs and search query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Provider category
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    /// Barber shops and men's salons
    MensSalon,
    /// Women's hair and beauty salons
    WomensSalon,
    /// General beauty clinics
    BeautyClinic,
    /// Laser treatment clinics
    LaserClinic,
    /// Skincare specialists
    Skincare,
}

impl ProviderCategory {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MensSalon => "mens_salon",
            Self::WomensSalon => "womens_salon",
            Self::BeautyClinic => "beauty_clinic",
            Self::LaserClinic => "laser_clinic",
            Self::Skincare => "skincare",
        }
    }
}

impl Display for ProviderCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mens_salon" => Ok(Self::MensSalon),
            "womens_salon" => Ok(Self::WomensSalon),
            "beauty_clinic" => Ok(Self::BeautyClinic),
            "laser_clinic" => Ok(Self::LaserClinic),
            "skincare" => Ok(Self::Skincare),
            _ => Err(AppError::invalid_input(format!(
                "Invalid provider category: {s}"
            ))),
        }
    }
}

/// Opening hours for one weekday
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayHours {
    /// Opening time, `HH:MM`
    pub open: String,
    /// Closing time, `HH:MM`
    pub close: String,
    /// Whether the provider opens on this day
    pub is_open: bool,
}

impl DayHours {
    fn open_day(open: &str, close: &str) -> Self {
        Self {
            open: open.to_owned(),
            close: close.to_owned(),
            is_open: true,
        }
    }

    fn validate(&self, day: &str) -> AppResult<()> {
        let open = NaiveTime::parse_from_str(&self.open, "%H:%M")
            .map_err(|_| AppError::invalid_input(format!("Invalid opening time for {day}")))?;
        let close = NaiveTime::parse_from_str(&self.close, "%H:%M")
            .map_err(|_| AppError::invalid_input(format!("Invalid closing time for {day}")))?;
        if self.is_open && close <= open {
            return Err(AppError::invalid_input(format!(
                "Closing time must be after opening time for {day}"
            )));
        }
        Ok(())
    }
}

/// Weekly opening hours, stored as `JSON`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingHours {
    /// Monday
    pub monday: DayHours,
    /// Tuesday
    pub tuesday: DayHours,
    /// Wednesday
    pub wednesday: DayHours,
    /// Thursday
    pub thursday: DayHours,
    /// Friday
    pub friday: DayHours,
    /// Saturday
    pub saturday: DayHours,
    /// Sunday
    pub sunday: DayHours,
}

impl Default for WorkingHours {
    fn default() -> Self {
        let weekday = DayHours::open_day("09:00", "18:00");
        Self {
            monday: weekday.clone(),
            tuesday: weekday.clone(),
            wednesday: weekday.clone(),
            thursday: weekday.clone(),
            friday: DayHours {
                is_open: false,
                ..weekday.clone()
            },
            saturday: weekday.clone(),
            sunday: weekday,
        }
    }
}

impl WorkingHours {
    /// Validate every day's `HH:MM` values
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` naming the first malformed day
    pub fn validate(&self) -> AppResult<()> {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
        .into_iter()
        .try_for_each(|(day, hours)| hours.validate(day))
    }
}

/// Service provider listed in the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Provider identifier
    pub id: Uuid,
    /// Business name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Street address
    pub address: String,
    /// Contact phone
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Directory category
    pub category: ProviderCategory,
    /// Weekly opening hours
    pub working_hours: WorkingHours,
    /// Owning user
    pub owner_id: Uuid,
    /// Admin moderation flag
    pub is_active: bool,
    /// Shown in public listings
    pub is_visible: bool,
    /// Mean review rating rounded to one decimal
    pub rating: f64,
    /// Number of reviews
    pub review_count: i64,
    /// Bookings ever made against this provider
    pub total_bookings: i64,
    /// Cover image
    pub image_url: Option<String>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Listed publicly
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.is_active && self.is_visible
    }
}

/// Input for creating a provider
#[derive(Debug, Clone, Deserialize)]
pub struct NewProvider {
    /// Business name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Street address
    pub address: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Category
    pub category: ProviderCategory,
    /// Weekly hours, defaults when omitted
    #[serde(default)]
    pub working_hours: WorkingHours,
    /// Cover image
    pub image_url: Option<String>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewProvider {
    /// Validate user supplied fields
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` on blank names, out-of-range coordinates or bad hours
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Provider name is required"));
        }
        if self.address.trim().is_empty() {
            return Err(AppError::invalid_input("Provider address is required"));
        }
        validate_coordinates(self.latitude, self.longitude)?;
        self.working_hours.validate()
    }
}

/// Partial provider update, only present fields change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderUpdate {
    /// Business name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Latitude
    pub latitude: Option<f64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// Cover image
    pub image_url: Option<String>,
    /// Tags
    pub tags: Option<Vec<String>>,
    /// Weekly hours
    pub working_hours: Option<WorkingHours>,
}

impl ProviderUpdate {
    /// Apply present fields onto an existing provider
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when an updated field fails validation
    pub fn apply_to(self, provider: &mut Provider) -> AppResult<()> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Provider name cannot be empty"));
            }
            provider.name = name;
        }
        if let Some(description) = self.description {
            provider.description = description;
        }
        if let Some(address) = self.address {
            provider.address = address;
        }
        if let Some(phone) = self.phone {
            provider.phone = phone;
        }
        if let Some(email) = self.email {
            provider.email = email;
        }
        if let Some(latitude) = self.latitude {
            provider.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            provider.longitude = longitude;
        }
        if let Some(image_url) = self.image_url {
            provider.image_url = Some(image_url);
        }
        if let Some(tags) = self.tags {
            provider.tags = tags;
        }
        if let Some(hours) = self.working_hours {
            hours.validate()?;
            provider.working_hours = hours;
        }
        validate_coordinates(provider.latitude, provider.longitude)?;
        provider.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> AppResult<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::invalid_input("Coordinates are out of range"));
    }
    Ok(())
}

/// Sort key for provider search
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSort {
    /// Nearest first, unknown distance last
    Distance,
    /// Highest rating first
    Rating,
    /// Most recently created first
    Newest,
    /// Case-insensitive name order
    Name,
}

/// Provider search query, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSearchQuery {
    /// Free text matched against name, then description and address
    pub search_query: Option<String>,
    /// Category filter
    pub category: Option<ProviderCategory>,
    /// Caller latitude
    pub latitude: Option<f64>,
    /// Caller longitude
    pub longitude: Option<f64>,
    /// Maximum distance in kilometres
    pub max_distance: Option<f64>,
    /// Sort key
    pub sort_by: Option<ProviderSort>,
    /// Minimum provider rating
    pub min_rating: Option<f64>,
    /// Maximum service price
    pub max_price: Option<f64>,
}

impl ProviderSearchQuery {
    /// Caller position when both coordinates are present
    #[must_use]
    pub const fn caller_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in [
            ProviderCategory::MensSalon,
            ProviderCategory::WomensSalon,
            ProviderCategory::BeautyClinic,
            ProviderCategory::LaserClinic,
            ProviderCategory::Skincare,
        ] {
            assert_eq!(category.as_str().parse::<ProviderCategory>().unwrap(), category);
        }
        assert!("spa".parse::<ProviderCategory>().is_err());
    }

    #[test]
    fn test_working_hours_validation() {
        let mut hours = WorkingHours::default();
        assert!(hours.validate().is_ok());

        hours.monday.close = "08:00".to_owned();
        assert!(hours.validate().is_err());

        hours.monday = DayHours {
            open: "9am".to_owned(),
            close: "18:00".to_owned(),
            is_open: true,
        };
        assert!(hours.validate().is_err());
    }

    #[test]
    fn test_caller_position_requires_both_coordinates() {
        let query = ProviderSearchQuery {
            latitude: Some(31.95),
            ..Default::default()
        };
        assert!(query.caller_position().is_none());
    }
}
