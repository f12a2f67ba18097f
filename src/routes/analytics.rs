// ABOUTME: Owner analytics route handlers for ranged provider analytics and the daily dashboard
// ABOUTME: Both endpoints require the caller to own the provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::authenticate;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::analytics::{self, AnalyticsRange};

/// Analytics routes implementation
pub struct AnalyticsRoutes;

impl AnalyticsRoutes {
    /// Create all analytics routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/providers/:id/analytics",
                get(Self::handle_analytics),
            )
            .route(
                "/api/providers/:id/dashboard",
                get(Self::handle_dashboard),
            )
            .with_state(resources)
    }

    /// Handle GET /api/providers/:id/analytics
    async fn handle_analytics(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Query(range): Query<AnalyticsRange>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let report =
            analytics::provider_analytics(&resources.database, auth.user_id, provider_id, &range)
                .await?;
        Ok((StatusCode::OK, Json(report)).into_response())
    }

    /// Handle GET /api/providers/:id/dashboard
    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let summary =
            analytics::dashboard_summary(&resources.database, auth.user_id, provider_id).await?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
