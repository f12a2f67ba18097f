// ABOUTME: Service catalog route handlers scoped to a provider
// ABOUTME: Listing inactive services and every mutation require the provider owner
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
use serde::Deserialize;
use uuid::Uuid;

use super::authenticate;
use crate::errors::AppError;
use crate::models::{NewService, ServiceSearchQuery, ServiceUpdate};
use crate::resources::ServerResources;
use crate::services::catalog;

/// Query parameters for a provider's service list
#[derive(Debug, Default, Deserialize)]
pub struct ProviderServicesQuery {
    /// Include deactivated services, owner only
    #[serde(default)]
    pub include_inactive: bool,
}

/// Service catalog routes implementation
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all service catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/providers/:id/services",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/services/search", get(Self::handle_search))
            .route(
                "/api/services/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/providers/:id/services
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Query(query): Query<ProviderServicesQuery>,
    ) -> Result<Response, AppError> {
        let caller = if query.include_inactive {
            Some(authenticate(&resources, &headers)?.user_id)
        } else {
            None
        };
        let services = catalog::services_for_provider(
            &resources.database,
            provider_id,
            query.include_inactive,
            caller,
        )
        .await?;
        Ok((StatusCode::OK, Json(services)).into_response())
    }

    /// Handle POST /api/providers/:id/services
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Json(input): Json<NewService>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let service =
            catalog::create_service(&resources.database, auth.user_id, provider_id, input).await?;
        Ok((StatusCode::CREATED, Json(service)).into_response())
    }

    /// Handle GET /api/services/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(service_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let service = resources.database.services().require(service_id).await?;
        Ok((StatusCode::OK, Json(service)).into_response())
    }

    /// Handle PUT /api/services/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(service_id): Path<Uuid>,
        Json(update): Json<ServiceUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let service =
            catalog::update_service(&resources.database, auth.user_id, service_id, update).await?;
        Ok((StatusCode::OK, Json(service)).into_response())
    }

    /// Handle DELETE /api/services/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(service_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        catalog::delete_service(&resources.database, auth.user_id, service_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/services/search
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ServiceSearchQuery>,
    ) -> Result<Response, AppError> {
        let services = catalog::search_services(&resources.database, &query).await?;
        Ok((StatusCode::OK, Json(services)).into_response())
    }
}
