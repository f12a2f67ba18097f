// ABOUTME: Notification inbox route handlers for listing, read flags and deletion
// ABOUTME: Every handler is scoped to the caller's own notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use uuid::Uuid;

use super::authenticate;
use super::reviews::LimitQuery;
use crate::constants::limits::NOTIFICATIONS_DEFAULT_LIMIT;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Notification routes implementation
pub struct NotificationRoutes;

impl NotificationRoutes {
    /// Create all notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/notifications", get(Self::handle_list))
            .route(
                "/api/notifications/unread-count",
                get(Self::handle_unread_count),
            )
            .route("/api/notifications/read-all", put(Self::handle_mark_all_read))
            .route("/api/notifications/:id/read", put(Self::handle_mark_read))
            .route("/api/notifications/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/notifications
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LimitQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let limit = query.limit.unwrap_or(NOTIFICATIONS_DEFAULT_LIMIT);
        let notifications = resources
            .database
            .notifications()
            .list(auth.user_id, limit)
            .await?;
        Ok((StatusCode::OK, Json(notifications)).into_response())
    }

    /// Handle GET /api/notifications/unread-count
    async fn handle_unread_count(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let count = resources
            .database
            .notifications()
            .unread_count(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "count": count }))).into_response())
    }

    /// Handle PUT /api/notifications/:id/read
    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(notification_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        resources
            .database
            .notifications()
            .mark_read(auth.user_id, notification_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle PUT /api/notifications/read-all
    async fn handle_mark_all_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let updated = resources
            .database
            .notifications()
            .mark_all_read(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "updated": updated }))).into_response())
    }

    /// Handle DELETE /api/notifications/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(notification_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        resources
            .database
            .notifications()
            .delete(auth.user_id, notification_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
