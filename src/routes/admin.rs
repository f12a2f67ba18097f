// ABOUTME: Admin API route handlers for statistics, moderation, bulk deletes and admin management
// ABOUTME: Every handler runs the role guard before delegating to the admin service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Admin routes
//!
//! All handlers are thin wrappers: authenticate, check the admin role,
//! delegate to [`crate::services::admin`], serialize.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::authenticate;
use crate::constants::limits::ADMIN_LIST_DEFAULT_LIMIT;
use crate::errors::AppError;
use crate::middleware::{require_admin, require_admin_role};
use crate::models::{AdminRole, AdminUser, BookingStatus, NewAdminUser, NewNotification};
use crate::resources::ServerResources;
use crate::services::{admin, bookings};

/// Paging for admin lists
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    /// Page size
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

/// Filter for the admin bookings view
#[derive(Debug, Default, Deserialize)]
pub struct AdminBookingsQuery {
    /// Only bookings in this status
    pub status: Option<BookingStatus>,
    /// Page size, clamped to 500
    pub limit: Option<u32>,
}

/// Activation toggle
#[derive(Debug, Deserialize)]
pub struct ProviderStatusRequest {
    /// New active flag
    pub is_active: bool,
}

/// Visibility toggle
#[derive(Debug, Deserialize)]
pub struct ProviderVisibilityRequest {
    /// New visible flag
    pub is_visible: bool,
}

/// Admin status of the caller
#[derive(Debug, Serialize)]
pub struct AdminStatusResponse {
    /// Caller has an active admin record
    pub is_admin: bool,
    /// The admin record, if any
    pub admin: Option<AdminUser>,
}

/// Admin routes implementation
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/me", get(Self::handle_me))
            .route("/api/admin/users", get(Self::handle_list_users))
            .route("/api/admin/users/admins", post(Self::handle_add_admin))
            .route("/api/admin/stats", get(Self::handle_stats))
            .route("/api/admin/stats/snapshot", post(Self::handle_snapshot))
            .route(
                "/api/admin/providers",
                get(Self::handle_list_providers).delete(Self::handle_delete_all_providers),
            )
            .route(
                "/api/admin/providers/:id",
                delete(Self::handle_delete_provider),
            )
            .route(
                "/api/admin/providers/:id/status",
                put(Self::handle_provider_status),
            )
            .route(
                "/api/admin/providers/:id/visibility",
                put(Self::handle_provider_visibility),
            )
            .route("/api/admin/bookings", get(Self::handle_list_bookings))
            .route(
                "/api/admin/notifications",
                post(Self::handle_create_notification),
            )
            .route("/api/admin/data", delete(Self::handle_delete_all_data))
            .with_state(resources)
    }

    /// Handle GET /api/admin/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let admin = resources
            .database
            .admin()
            .get_by_user(auth.user_id)
            .await?
            .filter(|admin| admin.is_active);
        let response = AdminStatusResponse {
            is_admin: admin.is_some(),
            admin,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/admin/users/admins
    async fn handle_add_admin(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<NewAdminUser>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin_role(auth.user_id, AdminRole::SuperAdmin, &resources.database).await?;
        let admin = admin::add_admin(&resources.database, auth.user_id, input).await?;
        Ok((StatusCode::CREATED, Json(admin)).into_response())
    }

    /// Handle GET /api/admin/stats
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let stats = admin::system_stats(&resources.database).await?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }

    /// Handle POST /api/admin/stats/snapshot
    async fn handle_snapshot(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let snapshot = admin::save_snapshot(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }

    /// Handle GET /api/admin/users
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<AdminListQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let users = admin::admin_users(
            &resources.database,
            query.limit.unwrap_or(ADMIN_LIST_DEFAULT_LIMIT),
            query.offset.unwrap_or(0),
        )
        .await?;
        Ok((StatusCode::OK, Json(users)).into_response())
    }

    /// Handle GET /api/admin/providers
    async fn handle_list_providers(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<AdminListQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let providers = admin::admin_providers(
            &resources.database,
            query.limit.unwrap_or(ADMIN_LIST_DEFAULT_LIMIT),
        )
        .await?;
        Ok((StatusCode::OK, Json(providers)).into_response())
    }

    /// Handle GET /api/admin/bookings
    async fn handle_list_bookings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<AdminBookingsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let views = bookings::all_bookings(&resources.database, query.status, query.limit).await?;
        Ok((StatusCode::OK, Json(views)).into_response())
    }

    /// Handle PUT /api/admin/providers/:id/status
    async fn handle_provider_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Json(request): Json<ProviderStatusRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let provider = admin::set_provider_active(
            &resources.database,
            auth.user_id,
            provider_id,
            request.is_active,
        )
        .await?;
        Ok((StatusCode::OK, Json(provider)).into_response())
    }

    /// Handle PUT /api/admin/providers/:id/visibility
    async fn handle_provider_visibility(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Json(request): Json<ProviderVisibilityRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let provider = admin::set_provider_visible(
            &resources.database,
            auth.user_id,
            provider_id,
            request.is_visible,
        )
        .await?;
        Ok((StatusCode::OK, Json(provider)).into_response())
    }

    /// Handle DELETE /api/admin/providers/:id
    async fn handle_delete_provider(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        let details = admin::delete_provider(&resources.database, auth.user_id, provider_id).await?;
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "deleted": true, "details": details })),
        )
            .into_response())
    }

    /// Handle DELETE /api/admin/providers
    async fn handle_delete_all_providers(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin_role(auth.user_id, AdminRole::SuperAdmin, &resources.database).await?;
        let report = admin::delete_all_providers(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(report)).into_response())
    }

    /// Handle DELETE /api/admin/data
    async fn handle_delete_all_data(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin_role(auth.user_id, AdminRole::SuperAdmin, &resources.database).await?;
        let report = admin::delete_all_data(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(report)).into_response())
    }

    /// Handle POST /api/admin/notifications
    async fn handle_create_notification(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(draft): Json<NewNotification>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        require_admin(auth.user_id, &resources.database).await?;
        resources.database.users().require(draft.user_id).await?;
        let notification = resources.database.notifications().create(&draft).await?;
        Ok((StatusCode::CREATED, Json(notification)).into_response())
    }
}
