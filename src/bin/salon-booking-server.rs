// ABOUTME: HTTP server binary for the salon and clinic booking platform
// ABOUTME: Loads configuration, opens the database, and serves the axum API until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! # Salon Booking Server Binary
//!
//! Starts the booking API with JWT authentication and `SQLite` storage.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use salon_booking_server::{
    auth::AuthManager,
    config::{environment::ServerConfig, DatabaseUrl},
    database::Database,
    logging,
    middleware::{make_request_span, setup_cors},
    resources::ServerResources,
    routes,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "salon-booking-server")]
#[command(about = "Salon Booking API - marketplace for salons and clinics")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&database_url);
    }

    logging::init_from_env()?;

    info!("Starting Salon Booking API");
    info!("{}", config.summary());

    if let DatabaseUrl::SQLite { path } = &config.database.url {
        ensure_parent_dir(path)?;
    }

    let database = Database::new(
        &config.database.url.to_connection_string(),
        config.database.max_connections,
    )
    .await?;
    info!("Database URL: {}", config.database.url);

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiry_hours,
    );
    info!("Authentication manager initialized");

    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;
    let cors = setup_cors(&config);

    let resources = Arc::new(ServerResources::new(database, auth_manager, config));
    let app = routes::router(&resources)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(cors);

    display_available_endpoints(&resources.config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

/// Create the directory holding a file database
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }
    Ok(())
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received, draining connections");
}

/// Display all available API endpoints
fn display_available_endpoints(config: &ServerConfig) {
    let base = format!("http://{}:{}", config.host, config.http_port);

    info!("=== Available API Endpoints ===");
    display_auth_endpoints(&base);
    display_directory_endpoints(&base);
    display_booking_endpoints(&base);
    display_engagement_endpoints(&base);
    display_admin_endpoints(&base);
    info!("=== End of Endpoint List ===");
}

#[allow(clippy::cognitive_complexity)]
fn display_auth_endpoints(base: &str) {
    info!("Health & Authentication:");
    info!("   Health Check:      GET  {base}/health");
    info!("   Register:          POST {base}/api/auth/register");
    info!("   Login:             POST {base}/api/auth/login");
    info!("   Profile:           GET  {base}/api/users/me");
}

#[allow(clippy::cognitive_complexity)]
fn display_directory_endpoints(base: &str) {
    info!("Providers & Services:");
    info!("   Search Providers:  GET  {base}/api/providers/search");
    info!("   Top Providers:     GET  {base}/api/providers/top");
    info!("   Provider Details:  GET  {base}/api/providers/{{id}}");
    info!("   Provider Services: GET  {base}/api/providers/{{id}}/services");
    info!("   Search Services:   GET  {base}/api/services/search");
    info!("   Active Promotions: GET  {base}/api/promotions/active");
}

#[allow(clippy::cognitive_complexity)]
fn display_booking_endpoints(base: &str) {
    info!("Bookings:");
    info!("   Create Booking:    POST {base}/api/bookings");
    info!("   My Bookings:       GET  {base}/api/bookings/mine");
    info!("   Update Status:     PUT  {base}/api/bookings/{{id}}/status");
    info!("   Cancel Booking:    POST {base}/api/bookings/{{id}}/cancel");
    info!("   Provider Bookings: GET  {base}/api/providers/{{id}}/bookings");
}

#[allow(clippy::cognitive_complexity)]
fn display_engagement_endpoints(base: &str) {
    info!("Reviews, Loyalty & Notifications:");
    info!("   Create Review:     POST {base}/api/reviews");
    info!("   Loyalty Summary:   GET  {base}/api/loyalty");
    info!("   Redeem Points:     POST {base}/api/loyalty/redeem");
    info!("   Notifications:     GET  {base}/api/notifications");
    info!("   Analytics:         GET  {base}/api/providers/{{id}}/analytics");
}

#[allow(clippy::cognitive_complexity)]
fn display_admin_endpoints(base: &str) {
    info!("Admin:");
    info!("   System Stats:      GET  {base}/api/admin/stats");
    info!("   Providers:         GET  {base}/api/admin/providers");
    info!("   Bookings:          GET  {base}/api/admin/bookings");
    info!("   Delete All Data:   DELETE {base}/api/admin/data");
}
