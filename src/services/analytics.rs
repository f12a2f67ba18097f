// ABOUTME: Owner-facing analytics over a provider's bookings and reviews
// ABOUTME: Date-ranged summary with status distribution, plus a compact daily dashboard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bookings::{enrich, BookingView, Enrichment};
use super::ensure_provider_owner;
use super::reviews::{provider_reviews, ProviderReviewView};
use crate::constants::limits::{ANALYTICS_RECENT_BOOKINGS, DASHBOARD_PREVIEW_ROWS};
use crate::database::{today, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{round_rating, validate_date, Booking, BookingStatus};

/// Optional inclusive booking date window
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsRange {
    /// First day, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD`
    pub end_date: Option<String>,
}

impl AnalyticsRange {
    /// Validate both bounds and their order
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for malformed dates or a reversed window
    pub fn validate(&self) -> AppResult<()> {
        let start = self.start_date.as_deref().map(validate_date).transpose()?;
        let end = self.end_date.as_deref().map(validate_date).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::invalid_input(
                    "start_date must not be after end_date",
                ));
            }
        }
        Ok(())
    }
}

/// Totals for the selected window
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    /// Bookings in the window
    pub total_bookings: usize,
    /// Revenue of completed bookings in the window
    pub total_revenue: f64,
    /// Mean review rating for bookings in the window, one decimal
    pub average_rating: f64,
    /// Distinct booking days
    pub total_days: usize,
}

/// Provider analytics response
#[derive(Debug, Clone, Serialize)]
pub struct ProviderAnalytics {
    /// Totals
    pub summary: AnalyticsSummary,
    /// Booking count per status
    pub status_distribution: BTreeMap<String, usize>,
    /// Most recent bookings in the window
    pub bookings: Vec<BookingView>,
}

/// Owner dashboard response
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Bookings dated today
    pub today_bookings: i64,
    /// Bookings awaiting a decision
    pub pending_bookings: i64,
    /// Completed revenue since the first of the month
    pub monthly_revenue: f64,
    /// Current provider rating
    pub average_rating: f64,
    /// Next confirmed bookings
    pub upcoming_bookings: Vec<BookingView>,
    /// Newest reviews
    pub recent_reviews: Vec<ProviderReviewView>,
}

/// Analytics over an owned provider's bookings within an optional window
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a bad window and `PERMISSION_DENIED` for non-owners
pub async fn provider_analytics(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
    range: &AnalyticsRange,
) -> AppResult<ProviderAnalytics> {
    range.validate()?;
    ensure_provider_owner(database, provider_id, owner_id).await?;

    let start = range.start_date.as_deref();
    let end = range.end_date.as_deref();
    let mut bookings = database
        .bookings()
        .list_in_range(provider_id, start, end)
        .await?;
    let average = database
        .reviews()
        .average_for_bookings(provider_id, start, end)
        .await?;

    let summary = summarize(&bookings, average);
    let status_distribution = status_distribution(&bookings);
    bookings.truncate(ANALYTICS_RECENT_BOOKINGS);
    let bookings = enrich(database, bookings, Enrichment::OWNER).await?;

    Ok(ProviderAnalytics {
        summary,
        status_distribution,
        bookings,
    })
}

fn summarize(bookings: &[Booking], average_rating: Option<f64>) -> AnalyticsSummary {
    let total_revenue = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
        .map(|b| b.total_price)
        .sum();
    let days: BTreeSet<&str> = bookings.iter().map(|b| b.date.as_str()).collect();
    AnalyticsSummary {
        total_bookings: bookings.len(),
        total_revenue,
        average_rating: average_rating.map_or(0.0, round_rating),
        total_days: days.len(),
    }
}

fn status_distribution(bookings: &[Booking]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for booking in bookings {
        *distribution
            .entry(booking.status.as_str().to_owned())
            .or_insert(0) += 1;
    }
    distribution
}

/// Today's snapshot for an owned provider
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-owners
pub async fn dashboard_summary(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
) -> AppResult<DashboardSummary> {
    let provider = ensure_provider_owner(database, provider_id, owner_id).await?;
    let today = today();
    let month_start = Utc::now().format("%Y-%m-01").to_string();

    let bookings = database.bookings();
    let today_bookings = bookings.count_on_date(Some(provider_id), &today).await?;
    let pending_bookings = bookings
        .status_counts(Some(provider_id))
        .await?
        .get(BookingStatus::Pending.as_str())
        .copied()
        .unwrap_or(0);
    let monthly_revenue = bookings
        .completed_revenue(Some(provider_id), Some(&month_start))
        .await?;
    let upcoming = bookings
        .upcoming_confirmed(provider_id, &today, DASHBOARD_PREVIEW_ROWS)
        .await?;
    let upcoming_bookings = enrich(database, upcoming, Enrichment::OWNER).await?;
    let recent_reviews = provider_reviews(database, provider_id, DASHBOARD_PREVIEW_ROWS).await?;

    Ok(DashboardSummary {
        today_bookings,
        pending_bookings,
        monthly_revenue,
        average_rating: provider.rating,
        upcoming_bookings,
        recent_reviews,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(date: &str, status: BookingStatus, price: f64) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: date.to_owned(),
            time: "10:00".to_owned(),
            status,
            total_price: price,
            custom_price: None,
            notes: None,
            provider_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_range_validation() {
        let ok = AnalyticsRange {
            start_date: Some("2025-06-01".to_owned()),
            end_date: Some("2025-06-30".to_owned()),
        };
        assert!(ok.validate().is_ok());

        let reversed = AnalyticsRange {
            start_date: Some("2025-07-01".to_owned()),
            end_date: Some("2025-06-30".to_owned()),
        };
        assert!(reversed.validate().is_err());

        let malformed = AnalyticsRange {
            start_date: Some("06/01/2025".to_owned()),
            end_date: None,
        };
        assert!(malformed.validate().is_err());
        assert!(AnalyticsRange::default().validate().is_ok());
    }

    #[test]
    fn test_summary_counts_completed_revenue_only() {
        let bookings = vec![
            booking("2025-06-01", BookingStatus::Completed, 25.0),
            booking("2025-06-01", BookingStatus::Completed, 20.0),
            booking("2025-06-02", BookingStatus::Cancelled, 30.0),
            booking("2025-06-03", BookingStatus::Pending, 15.0),
        ];
        let summary = summarize(&bookings, Some(4.25));
        assert_eq!(summary.total_bookings, 4);
        assert!((summary.total_revenue - 45.0).abs() < f64::EPSILON);
        assert!((summary.average_rating - 4.3).abs() < f64::EPSILON);
        assert_eq!(summary.total_days, 3);

        let distribution = status_distribution(&bookings);
        assert_eq!(distribution.get("completed"), Some(&2));
        assert_eq!(distribution.get("cancelled"), Some(&1));
        assert_eq!(distribution.get("confirmed"), None);
    }
}
