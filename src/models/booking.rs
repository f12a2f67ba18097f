// ABOUTME: Booking models and the booking status state machine
// ABOUTME: Defines legal status transitions, slot-holding statuses and booking inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Booking lifecycle status
///
/// ```text
/// pending   -> confirmed | rejected | cancelled
/// confirmed -> completed | cancelled | no_show
/// ```
///
/// Every other status is terminal.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting provider decision
    #[default]
    Pending,
    /// Accepted by the provider
    Confirmed,
    /// Declined by the provider
    Rejected,
    /// Service delivered
    Completed,
    /// Cancelled by customer or provider
    Cancelled,
    /// Customer did not show up
    NoShow,
}

impl BookingStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Rejected,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Whether a booking in this status occupies its time slot
    #[must_use]
    pub const fn holds_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// No further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Completed | Self::Cancelled | Self::NoShow
        )
    }

    /// Whether moving from `self` to `target` is a legal edge
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Confirmed | Self::Rejected | Self::Cancelled
            ) | (
                Self::Confirmed,
                Self::Completed | Self::Cancelled | Self::NoShow
            )
        )
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            _ => Err(AppError::invalid_input(format!(
                "Invalid booking status: {s}"
            ))),
        }
    }
}

/// Appointment of a customer with a provider for one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub id: Uuid,
    /// Provider being booked
    pub provider_id: Uuid,
    /// Service being booked
    pub service_id: Uuid,
    /// Customer
    pub user_id: Uuid,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Amount due, the service price unless overridden
    pub total_price: f64,
    /// Provider override of the price
    pub custom_price: Option<f64>,
    /// Customer notes
    pub notes: Option<String>,
    /// Provider notes
    pub provider_notes: Option<String>,
    /// Reason given on rejection
    pub rejection_reason: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Booking request from a customer
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    /// Provider to book
    pub provider_id: Uuid,
    /// Service to book
    pub service_id: Uuid,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Customer notes
    pub notes: Option<String>,
}

impl NewBooking {
    /// Validate and normalize date and time
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when date or time do not parse
    pub fn validate(&self) -> AppResult<()> {
        validate_date(&self.date)?;
        validate_time(&self.time)?;
        Ok(())
    }
}

/// Provider decision on a booking
#[derive(Debug, Clone, Deserialize)]
pub struct BookingStatusUpdate {
    /// Target status, never `pending`
    pub status: BookingStatus,
    /// Price override, sets `total_price` too
    pub custom_price: Option<f64>,
    /// Provider notes
    pub provider_notes: Option<String>,
    /// Reason for rejection
    pub rejection_reason: Option<String>,
}

impl BookingStatusUpdate {
    /// Validate the requested change
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a `pending` target or a non-positive price
    pub fn validate(&self) -> AppResult<()> {
        if self.status == BookingStatus::Pending {
            return Err(AppError::invalid_input(
                "Bookings cannot be moved back to pending",
            ));
        }
        if let Some(price) = self.custom_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(AppError::invalid_input(
                    "Custom price must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

/// Parse an ISO calendar date
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the string is not `YYYY-MM-DD`
pub fn validate_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .filter(|_| date.len() == 10)
        .ok_or_else(|| AppError::invalid_input(format!("Invalid date (expected YYYY-MM-DD): {date}")))
}

/// Parse a 24h `HH:MM` time
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the string is not `HH:MM`
pub fn validate_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .ok()
        .filter(|_| time.len() == 5)
        .ok_or_else(|| AppError::invalid_input(format!("Invalid time (expected HH:MM): {time}")))
}
