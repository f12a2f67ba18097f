// ABOUTME: Loyalty program route handlers for balances, enrolment, grants and redemptions
// ABOUTME: Grants are restricted to the provider owner or an admin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::authenticate;
use crate::constants::limits::LOYALTY_HISTORY_LIMIT;
use crate::errors::AppError;
use crate::models::{AddPointsRequest, RedeemPointsRequest};
use crate::resources::ServerResources;
use crate::services::loyalty;

/// Loyalty routes implementation
pub struct LoyaltyRoutes;

impl LoyaltyRoutes {
    /// Create all loyalty routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/loyalty", get(Self::handle_summary))
            .route("/api/loyalty/initialize", post(Self::handle_initialize))
            .route("/api/loyalty/points", post(Self::handle_add_points))
            .route("/api/loyalty/redeem", post(Self::handle_redeem))
            .with_state(resources)
    }

    /// Handle GET /api/loyalty
    async fn handle_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let summary = resources
            .database
            .loyalty()
            .summary(auth.user_id, LOYALTY_HISTORY_LIMIT)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Loyalty account").with_resource_id(auth.user_id.to_string())
            })?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }

    /// Handle POST /api/loyalty/initialize
    async fn handle_initialize(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let account = resources.database.loyalty().initialize(auth.user_id).await?;
        Ok((StatusCode::CREATED, Json(account)).into_response())
    }

    /// Handle POST /api/loyalty/points
    async fn handle_add_points(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<AddPointsRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let account = loyalty::add_points(&resources.database, auth.user_id, &request).await?;
        Ok((StatusCode::OK, Json(account)).into_response())
    }

    /// Handle POST /api/loyalty/redeem
    async fn handle_redeem(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<RedeemPointsRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let account = resources
            .database
            .loyalty()
            .redeem(auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(account)).into_response())
    }
}
