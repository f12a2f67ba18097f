// ABOUTME: Review listings with reviewer, service and provider names attached
// ABOUTME: Reviewer emails are masked before they leave the service layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{Review, ReviewerSummary};

/// Review as shown on a provider page
#[derive(Debug, Clone, Serialize)]
pub struct ProviderReviewView {
    /// Review record
    #[serde(flatten)]
    pub review: Review,
    /// Reviewer name and masked email
    pub reviewer: Option<ReviewerSummary>,
    /// Name of the reviewed service, `None` once it was deleted
    pub service_name: Option<String>,
}

/// Review as shown in the author's own list
#[derive(Debug, Clone, Serialize)]
pub struct UserReviewView {
    /// Review record
    #[serde(flatten)]
    pub review: Review,
    /// Reviewed provider name
    pub provider_name: Option<String>,
}

/// Newest reviews of a provider
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn provider_reviews(
    database: &Database,
    provider_id: Uuid,
    limit: u32,
) -> AppResult<Vec<ProviderReviewView>> {
    let reviews = database.reviews().list_by_provider(provider_id, limit).await?;

    let user_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
    let booking_ids: Vec<Uuid> = reviews.iter().map(|r| r.booking_id).collect();
    let users = database.users_by_ids(&user_ids).await?;
    let bookings = database.bookings_by_ids(&booking_ids).await?;
    let service_ids: Vec<Uuid> = bookings.values().map(|b| b.service_id).collect();
    let services = database.services_by_ids(&service_ids).await?;

    Ok(reviews
        .into_iter()
        .map(|review| {
            let service_name = bookings
                .get(&review.booking_id)
                .and_then(|booking| services.get(&booking.service_id))
                .map(|service| service.name.clone());
            ProviderReviewView {
                reviewer: users.get(&review.user_id).map(ReviewerSummary::from),
                service_name,
                review,
            }
        })
        .collect())
}

/// Reviews written by a user
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn user_reviews(database: &Database, user_id: Uuid) -> AppResult<Vec<UserReviewView>> {
    let reviews = database.reviews().list_by_user(user_id).await?;
    let provider_ids: Vec<Uuid> = reviews.iter().map(|r| r.provider_id).collect();
    let providers = database.providers_by_ids(&provider_ids).await?;

    Ok(reviews
        .into_iter()
        .map(|review| UserReviewView {
            provider_name: providers.get(&review.provider_id).map(|p| p.name.clone()),
            review,
        })
        .collect())
}
