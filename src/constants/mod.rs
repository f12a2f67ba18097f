// ABOUTME: Application constants grouped by domain
// ABOUTME: Environment lookups, query limits, loyalty thresholds and notification copy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

use std::env;

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8081)
    }

    /// Get bind host from environment or default
    #[must_use]
    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned())
    }

    /// Get database URL from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/salon_booking.db".to_owned())
    }

    /// Get log level from environment or default
    #[must_use]
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned())
    }
}

/// Service identity used in logs and JWT audience
pub mod service_names {
    /// Service name for structured logging
    pub const SALON_BOOKING_SERVER: &str = "salon-booking-server";
    /// JWT audience claim
    pub const API_AUDIENCE: &str = "salon-booking-api";
}

/// Query limits and defaults
pub mod limits {
    /// Default JWT lifetime
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
    /// Default pool size for file-backed databases
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    /// `SQLite` busy timeout
    pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;
    /// Attempts for transactions that hit lock contention
    pub const TRANSACTION_MAX_RETRIES: u32 = 3;

    /// Default page size for the admin bookings view
    pub const ADMIN_BOOKINGS_DEFAULT_LIMIT: u32 = 100;
    /// Maximum page size for the admin bookings view
    pub const ADMIN_BOOKINGS_MAX_LIMIT: u32 = 500;
    /// Default page size for admin user and provider listings
    pub const ADMIN_LIST_DEFAULT_LIMIT: u32 = 50;
    /// Default number of reviews returned for a provider
    pub const PROVIDER_REVIEWS_DEFAULT_LIMIT: u32 = 20;
    /// Default number of notifications returned for a user
    pub const NOTIFICATIONS_DEFAULT_LIMIT: u32 = 50;
    /// Default number of top providers
    pub const TOP_PROVIDERS_DEFAULT_LIMIT: u32 = 10;
    /// Services shown per provider in the top providers list
    pub const TOP_PROVIDERS_SERVICES_PREVIEW: usize = 3;
    /// Provider rows in the system stats leaderboard
    pub const SYSTEM_STATS_TOP_PROVIDERS: u32 = 5;
    /// Rows in the system stats recent activity lists
    pub const SYSTEM_STATS_RECENT_ACTIVITY: u32 = 10;
    /// Recent bookings in provider analytics
    pub const ANALYTICS_RECENT_BOOKINGS: usize = 20;
    /// Upcoming bookings and recent reviews on the owner dashboard
    pub const DASHBOARD_PREVIEW_ROWS: u32 = 5;
    /// Ledger rows returned with a loyalty summary
    pub const LOYALTY_HISTORY_LIMIT: u32 = 50;
    /// Days counted as "recent" for active users and new signups
    pub const RECENT_ACTIVITY_DAYS: i64 = 30;
}

/// Provider search tuning
pub mod search {
    /// Earth radius used by the haversine distance, in kilometres
    pub const EARTH_RADIUS_KM: f64 = 6371.0;
    /// Below this many name hits, description and address are scanned too
    pub const MIN_NAME_MATCHES: usize = 5;
}

/// Loyalty program constants
pub mod loyalty {
    /// Points granted when a user joins the program
    pub const WELCOME_POINTS: i64 = 100;
    /// Balance at which a user reaches the silver tier
    pub const SILVER_THRESHOLD: i64 = 500;
    /// Balance at which a user reaches the gold tier
    pub const GOLD_THRESHOLD: i64 = 1000;
    /// Upper bound for a single account balance and for a single grant
    pub const MAX_POINTS_BALANCE: i64 = 1_000_000_000;
}

/// Notification titles
pub mod notification_titles {
    /// Sent to the provider owner when a booking is created
    pub const NEW_BOOKING: &str = "New booking";
    /// Sent to the customer on confirmation
    pub const BOOKING_CONFIRMED: &str = "Booking confirmed";
    /// Sent to the customer on rejection
    pub const BOOKING_REJECTED: &str = "Booking rejected";
    /// Sent to the customer on completion
    pub const SERVICE_COMPLETED: &str = "Service completed";
    /// Sent to the provider owner on customer cancellation
    pub const BOOKING_CANCELLED: &str = "Booking cancelled";
    /// Sent when loyalty points are granted
    pub const POINTS_ADDED: &str = "Loyalty points added";
    /// Sent when loyalty points are redeemed
    pub const POINTS_REDEEMED: &str = "Points redeemed";
    /// Sent when an admin activates a provider
    pub const PROVIDER_ACTIVATED: &str = "Provider activated";
    /// Sent when an admin deactivates a provider
    pub const PROVIDER_DEACTIVATED: &str = "Provider deactivated";
    /// Sent when an admin makes a provider visible
    pub const PROVIDER_SHOWN: &str = "Provider visible";
    /// Sent when an admin hides a provider
    pub const PROVIDER_HIDDEN: &str = "Provider hidden";
}
