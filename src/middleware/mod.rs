// ABOUTME: HTTP middleware for request tracing, CORS and admin authorization
// ABOUTME: Provides the request span factory, CORS layer and the admin role guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

/// Admin role guard
pub mod admin_guard;
/// CORS configuration
pub mod cors;
/// Request spans
pub mod tracing;

pub use admin_guard::{require_admin, require_admin_role};
pub use cors::setup_cors;
pub use tracing::{make_request_span, record_user};
