// ABOUTME: Review route handlers for posting reviews of completed bookings and listing them
// ABOUTME: Posting a review refreshes the provider rating in the same transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::authenticate;
use crate::constants::limits::PROVIDER_REVIEWS_DEFAULT_LIMIT;
use crate::errors::AppError;
use crate::models::NewReview;
use crate::resources::ServerResources;
use crate::services::reviews;

/// Optional page size
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Number of rows
    pub limit: Option<u32>,
}

/// Review routes implementation
pub struct ReviewRoutes;

impl ReviewRoutes {
    /// Create all review routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/reviews", post(Self::handle_create))
            .route("/api/reviews/mine", get(Self::handle_mine))
            .route(
                "/api/providers/:id/reviews",
                get(Self::handle_provider_reviews),
            )
            .with_state(resources)
    }

    /// Handle POST /api/reviews
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<NewReview>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let review = resources
            .database
            .reviews()
            .create(auth.user_id, input)
            .await?;
        Ok((StatusCode::CREATED, Json(review)).into_response())
    }

    /// Handle GET /api/reviews/mine
    async fn handle_mine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let views = reviews::user_reviews(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(views)).into_response())
    }

    /// Handle GET /api/providers/:id/reviews
    async fn handle_provider_reviews(
        State(resources): State<Arc<ServerResources>>,
        Path(provider_id): Path<Uuid>,
        Query(query): Query<LimitQuery>,
    ) -> Result<Response, AppError> {
        let limit = query.limit.unwrap_or(PROVIDER_REVIEWS_DEFAULT_LIMIT);
        let views = reviews::provider_reviews(&resources.database, provider_id, limit).await?;
        Ok((StatusCode::OK, Json(views)).into_response())
    }
}
