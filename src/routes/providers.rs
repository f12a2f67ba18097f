// ABOUTME: Provider directory route handlers for search, ranking, details and owner CRUD
// ABOUTME: Public reads need no token; writes resolve ownership in the service layer
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
use crate::errors::AppError;
use crate::models::{NewProvider, ProviderCategory, ProviderSearchQuery, ProviderUpdate};
use crate::resources::ServerResources;
use crate::services::providers;

/// Query parameters for the top providers list
#[derive(Debug, Default, Deserialize)]
pub struct TopProvidersQuery {
    /// Restrict to one category
    pub category: Option<ProviderCategory>,
    /// Number of providers, 10 when absent
    pub limit: Option<u32>,
}

/// Provider routes implementation
pub struct ProviderRoutes;

impl ProviderRoutes {
    /// Create all provider routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/providers", post(Self::handle_create))
            .route("/api/providers/search", get(Self::handle_search))
            .route("/api/providers/top", get(Self::handle_top))
            .route("/api/providers/mine", get(Self::handle_mine))
            .route(
                "/api/providers/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/providers/:id/stats", post(Self::handle_update_stats))
            .with_state(resources)
    }

    /// Handle GET /api/providers/search
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ProviderSearchQuery>,
    ) -> Result<Response, AppError> {
        let listings = providers::search_providers(&resources.database, &query).await?;
        Ok((StatusCode::OK, Json(listings)).into_response())
    }

    /// Handle GET /api/providers/top
    async fn handle_top(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<TopProvidersQuery>,
    ) -> Result<Response, AppError> {
        let top = providers::top_providers(&resources.database, query.category, query.limit).await?;
        Ok((StatusCode::OK, Json(top)).into_response())
    }

    /// Handle GET /api/providers/mine
    async fn handle_mine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let owned = providers::owner_providers(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(owned)).into_response())
    }

    /// Handle GET /api/providers/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let details = providers::provider_details(&resources.database, provider_id).await?;
        Ok((StatusCode::OK, Json(details)).into_response())
    }

    /// Handle POST /api/providers
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<NewProvider>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let provider = providers::create_provider(&resources.database, auth.user_id, input).await?;
        Ok((StatusCode::CREATED, Json(provider)).into_response())
    }

    /// Handle PUT /api/providers/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Json(update): Json<ProviderUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let provider =
            providers::update_provider(&resources.database, auth.user_id, provider_id, update)
                .await?;
        Ok((StatusCode::OK, Json(provider)).into_response())
    }

    /// Handle DELETE /api/providers/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let details =
            providers::delete_provider(&resources.database, auth.user_id, provider_id).await?;
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "deleted": true, "details": details })),
        )
            .into_response())
    }

    /// Handle POST /api/providers/:id/stats
    async fn handle_update_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let provider =
            providers::update_stats(&resources.database, auth.user_id, provider_id).await?;
        Ok((StatusCode::OK, Json(provider)).into_response())
    }
}
