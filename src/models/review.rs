// ABOUTME: Review models tied one-to-one to completed bookings
// ABOUTME: Review record, creation input and rating rounding helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Customer review of a completed booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Review identifier
    pub id: Uuid,
    /// Reviewed provider
    pub provider_id: Uuid,
    /// Reviewer
    pub user_id: Uuid,
    /// Reviewed booking
    pub booking_id: Uuid,
    /// Stars, 1 to 5
    pub rating: i64,
    /// Free-text comment
    pub comment: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Review submission
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    /// Provider being reviewed
    pub provider_id: Uuid,
    /// Completed booking
    pub booking_id: Uuid,
    /// Stars, 1 to 5
    pub rating: i64,
    /// Comment
    #[serde(default)]
    pub comment: String,
}

impl NewReview {
    /// Validate the rating range
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the rating is outside 1..=5
    pub fn validate(&self) -> AppResult<()> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(AppError::invalid_input("Rating must be between 1 and 5"))
        }
    }
}

/// Round a mean rating to one decimal place
#[must_use]
pub fn round_rating(mean: f64) -> f64 {
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rating() {
        assert!((round_rating(4.0 / 3.0 + 3.0) - 4.3).abs() < f64::EPSILON);
        assert!((round_rating(4.25) - 4.3).abs() < f64::EPSILON);
        assert!(round_rating(0.0).abs() < f64::EPSILON);
    }
}
