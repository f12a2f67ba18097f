// ABOUTME: Promotion route handlers for public active listings and owner management
// ABOUTME: Active promotions compare ISO dates against the current UTC day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::authenticate;
use crate::errors::AppError;
use crate::models::{NewPromotion, PromotionUpdate};
use crate::resources::ServerResources;
use crate::services::catalog;

/// Optional provider filter for active promotions
#[derive(Debug, Default, Deserialize)]
pub struct ActivePromotionsQuery {
    /// Only this provider's promotions
    pub provider_id: Option<Uuid>,
}

/// Promotion routes implementation
pub struct PromotionRoutes;

impl PromotionRoutes {
    /// Create all promotion routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/promotions/active", get(Self::handle_active))
            .route(
                "/api/promotions/:id",
                put(Self::handle_update).delete(Self::handle_delete),
            )
            .route(
                "/api/providers/:id/promotions",
                get(Self::handle_provider_promotions).post(Self::handle_create),
            )
            .with_state(resources)
    }

    /// Handle GET /api/promotions/active
    async fn handle_active(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ActivePromotionsQuery>,
    ) -> Result<Response, AppError> {
        let promotions = catalog::active_promotions(&resources.database, query.provider_id).await?;
        Ok((StatusCode::OK, Json(promotions)).into_response())
    }

    /// Handle POST /api/providers/:id/promotions
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Json(input): Json<NewPromotion>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let promotion =
            catalog::create_promotion(&resources.database, auth.user_id, provider_id, input)
                .await?;
        Ok((StatusCode::CREATED, Json(promotion)).into_response())
    }

    /// Handle GET /api/providers/:id/promotions
    async fn handle_provider_promotions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let promotions =
            catalog::provider_promotions(&resources.database, auth.user_id, provider_id).await?;
        Ok((StatusCode::OK, Json(promotions)).into_response())
    }

    /// Handle PUT /api/promotions/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(promotion_id): Path<Uuid>,
        Json(update): Json<PromotionUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let promotion =
            catalog::update_promotion(&resources.database, auth.user_id, promotion_id, update)
                .await?;
        Ok((StatusCode::OK, Json(promotion)).into_response())
    }

    /// Handle DELETE /api/promotions/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(promotion_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        catalog::delete_promotion(&resources.database, auth.user_id, promotion_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
