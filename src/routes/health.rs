// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports service name, version and a timestamp without touching the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use crate::constants::service_names;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes() -> axum::Router {
        use axum::{routing::get, Json, Router};

        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "healthy",
                "service": service_names::SALON_BOOKING_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
