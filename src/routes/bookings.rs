// ABOUTME: Booking workflow route handlers: create, status decisions, cancellation and listings
// ABOUTME: Slot conflicts and illegal transitions surface as 409 responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::authenticate;
use crate::errors::AppError;
use crate::models::{BookingStatus, BookingStatusUpdate, NewBooking};
use crate::resources::ServerResources;
use crate::services::bookings;

/// Optional status filter for an owner's booking list
#[derive(Debug, Default, Deserialize)]
pub struct BookingFilter {
    /// Only bookings in this status
    pub status: Option<BookingStatus>,
}

/// Booking routes implementation
pub struct BookingRoutes;

impl BookingRoutes {
    /// Create all booking routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/bookings", post(Self::handle_create))
            .route("/api/bookings/mine", get(Self::handle_mine))
            .route("/api/bookings/:id/status", put(Self::handle_update_status))
            .route("/api/bookings/:id/cancel", post(Self::handle_cancel))
            .route(
                "/api/providers/:id/bookings",
                get(Self::handle_provider_bookings),
            )
            .route(
                "/api/providers/:id/bookings/pending",
                get(Self::handle_pending),
            )
            .with_state(resources)
    }

    /// Handle POST /api/bookings
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<NewBooking>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let booking = resources
            .database
            .bookings()
            .create(auth.user_id, &input)
            .await?;
        Ok((StatusCode::CREATED, Json(booking)).into_response())
    }

    /// Handle GET /api/bookings/mine
    async fn handle_mine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let views = bookings::user_bookings(&resources.database, auth.user_id).await?;
        Ok((StatusCode::OK, Json(views)).into_response())
    }

    /// Handle PUT /api/bookings/:id/status
    async fn handle_update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(booking_id): Path<Uuid>,
        Json(update): Json<BookingStatusUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let booking = resources
            .database
            .bookings()
            .update_status(auth.user_id, booking_id, update)
            .await?;
        Ok((StatusCode::OK, Json(booking)).into_response())
    }

    /// Handle POST /api/bookings/:id/cancel
    async fn handle_cancel(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(booking_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let booking = resources
            .database
            .bookings()
            .cancel(auth.user_id, booking_id)
            .await?;
        Ok((StatusCode::OK, Json(booking)).into_response())
    }

    /// Handle GET /api/providers/:id/bookings
    async fn handle_provider_bookings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
        Query(filter): Query<BookingFilter>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let views = bookings::provider_bookings(
            &resources.database,
            auth.user_id,
            provider_id,
            filter.status,
        )
        .await?;
        Ok((StatusCode::OK, Json(views)).into_response())
    }

    /// Handle GET /api/providers/:id/bookings/pending
    async fn handle_pending(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(provider_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&resources, &headers)?;
        let views = bookings::provider_bookings(
            &resources.database,
            auth.user_id,
            provider_id,
            Some(BookingStatus::Pending),
        )
        .await?;
        Ok((StatusCode::OK, Json(views)).into_response())
    }
}
