// ABOUTME: Route module organization for the salon booking HTTP API
// ABOUTME: Assembles per-domain routers and shares the bearer authentication helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Route module
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer or a database manager.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;

use crate::auth::AuthResult;
use crate::errors::AppResult;
use crate::middleware::record_user;
use crate::resources::ServerResources;

/// Back-office routes
pub mod admin;
/// Provider analytics and dashboard routes
pub mod analytics;
/// Registration, login and profile routes
pub mod auth;
/// Booking workflow routes
pub mod bookings;
/// Health check route
pub mod health;
/// Loyalty program routes
pub mod loyalty;
/// Notification inbox routes
pub mod notifications;
/// Promotion routes
pub mod promotions;
/// Provider directory routes
pub mod providers;
/// Review routes
pub mod reviews;
/// Service catalog routes
pub mod services;

/// Admin route handlers
pub use admin::AdminRoutes;
/// Analytics route handlers
pub use analytics::AnalyticsRoutes;
/// Authentication route handlers
pub use auth::AuthRoutes;
/// Booking route handlers
pub use bookings::BookingRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Loyalty route handlers
pub use loyalty::LoyaltyRoutes;
/// Notification route handlers
pub use notifications::NotificationRoutes;
/// Promotion route handlers
pub use promotions::PromotionRoutes;
/// Provider route handlers
pub use providers::ProviderRoutes;
/// Review route handlers
pub use reviews::ReviewRoutes;
/// Service catalog route handlers
pub use services::ServiceRoutes;

/// Build the full API router without outer layers
pub fn router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(Arc::clone(resources)))
        .merge(ProviderRoutes::routes(Arc::clone(resources)))
        .merge(ServiceRoutes::routes(Arc::clone(resources)))
        .merge(BookingRoutes::routes(Arc::clone(resources)))
        .merge(ReviewRoutes::routes(Arc::clone(resources)))
        .merge(LoyaltyRoutes::routes(Arc::clone(resources)))
        .merge(PromotionRoutes::routes(Arc::clone(resources)))
        .merge(NotificationRoutes::routes(Arc::clone(resources)))
        .merge(AnalyticsRoutes::routes(Arc::clone(resources)))
        .merge(AdminRoutes::routes(Arc::clone(resources)))
}

/// Authenticate the bearer token and tag the request span with the caller
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` or `AUTH_INVALID`
pub(crate) fn authenticate(
    resources: &ServerResources,
    headers: &HeaderMap,
) -> AppResult<AuthResult> {
    let auth = resources.auth_manager.authenticate(headers)?;
    record_user(auth.user_id);
    Ok(auth)
}
