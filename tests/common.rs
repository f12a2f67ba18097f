// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, auth, user and marketplace fixture helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::uninlined_format_args
)]
//! Shared test utilities for `salon_booking_server`
//!
//! Common setup for the integration tests: an in-memory database, server
//! resources with a fixed secret, and small builders for users, providers,
//! services and bookings.

use anyhow::Result;
use salon_booking_server::{
    auth::{hash_password, AuthManager},
    config::ServerConfig,
    database::Database,
    models::{
        AdminRole, Booking, BookingStatus, BookingStatusUpdate, NewAdminUser, NewBooking,
        NewProvider, NewService, Provider, ProviderCategory, Service, User, WorkingHours,
    },
    resources::ServerResources,
};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Secret shared by every test token
pub const TEST_JWT_SECRET: &[u8] = b"salon-booking-test-secret-key-0123456789";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:", 1).await?)
}

/// File-backed database for tests that need several pooled connections
pub async fn create_file_database(dir: &tempfile::TempDir) -> Result<Database> {
    init_test_logging();
    let path = dir.path().join("bookings.db");
    Ok(Database::new(&format!("sqlite:{}", path.display()), 8).await?)
}

/// Create test authentication manager
pub fn create_test_auth_manager() -> AuthManager {
    AuthManager::new(TEST_JWT_SECRET.to_vec(), 24)
}

/// Server resources over a fresh in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::new(
        database,
        create_test_auth_manager(),
        ServerConfig::for_testing(TEST_JWT_SECRET),
    )))
}

/// Create a user with a real password hash
pub async fn create_test_user_with_email(database: &Database, email: &str) -> Result<User> {
    let user = User::new(
        email,
        hash_password("password123")?,
        Some("Test User".to_owned()),
    );
    database.users().create(&user).await?;
    Ok(user)
}

/// Create a user and return it with a valid bearer header value
pub async fn create_authenticated_user(
    resources: &ServerResources,
    email: &str,
) -> Result<(User, String)> {
    let user = create_test_user_with_email(&resources.database, email).await?;
    let session = resources.auth_manager.generate_token(&user)?;
    Ok((user, format!("Bearer {}", session.token)))
}

/// Create a user holding the given admin role
pub async fn create_admin_user(
    resources: &ServerResources,
    email: &str,
    role: AdminRole,
) -> Result<(User, String)> {
    let (user, bearer) = create_authenticated_user(resources, email).await?;
    resources
        .database
        .admin()
        .create(NewAdminUser {
            user_id: user.id,
            role,
            permissions: Vec::new(),
        })
        .await?;
    Ok((user, bearer))
}

/// Provider payload at the given position
pub fn new_provider(name: &str, category: ProviderCategory, latitude: f64, longitude: f64) -> NewProvider {
    NewProvider {
        name: name.to_owned(),
        description: format!("{name} description"),
        address: format!("{name} street 1"),
        phone: "+15550100".to_owned(),
        email: "contact@example.com".to_owned(),
        latitude,
        longitude,
        category,
        working_hours: WorkingHours::default(),
        image_url: None,
        tags: vec!["test".to_owned()],
    }
}

/// Create a provider owned by `owner_id`
pub async fn create_test_provider(database: &Database, owner_id: Uuid, name: &str) -> Result<Provider> {
    Ok(database
        .providers()
        .create(
            owner_id,
            new_provider(name, ProviderCategory::WomensSalon, 24.7136, 46.6753),
        )
        .await?)
}

/// Service payload
pub fn new_service(name: &str, price: f64) -> NewService {
    NewService {
        name: name.to_owned(),
        description: String::new(),
        price,
        duration_minutes: 30,
        is_active: None,
        category: None,
        image_url: None,
        tags: Vec::new(),
    }
}

/// Create an active service
pub async fn create_test_service(
    database: &Database,
    provider_id: Uuid,
    name: &str,
    price: f64,
) -> Result<Service> {
    Ok(database
        .services()
        .create(provider_id, new_service(name, price))
        .await?)
}

/// Booking payload
pub fn new_booking(provider: &Provider, service: &Service, date: &str, time: &str) -> NewBooking {
    NewBooking {
        provider_id: provider.id,
        service_id: service.id,
        date: date.to_owned(),
        time: time.to_owned(),
        notes: None,
    }
}

/// Status change without price or notes
pub const fn status_update(status: BookingStatus) -> BookingStatusUpdate {
    BookingStatusUpdate {
        status,
        custom_price: None,
        provider_notes: None,
        rejection_reason: None,
    }
}

/// Marketplace with one owner, one provider, one service and one customer
pub struct Marketplace {
    pub owner: User,
    pub customer: User,
    pub provider: Provider,
    pub service: Service,
}

/// Build the standard marketplace fixture
pub async fn create_marketplace(database: &Database) -> Result<Marketplace> {
    let owner = create_test_user_with_email(database, "owner@example.com").await?;
    let customer = create_test_user_with_email(database, "customer@example.com").await?;
    let provider = create_test_provider(database, owner.id, "Glow Studio").await?;
    let service = create_test_service(database, provider.id, "Haircut", 50.0).await?;
    Ok(Marketplace {
        owner,
        customer,
        provider,
        service,
    })
}

/// Create a booking and move it to completed
pub async fn create_completed_booking(
    database: &Database,
    market: &Marketplace,
    date: &str,
    time: &str,
) -> Result<Booking> {
    let booking = database
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, date, time),
        )
        .await?;
    database
        .bookings()
        .update_status(market.owner.id, booking.id, status_update(BookingStatus::Confirmed))
        .await?;
    Ok(database
        .bookings()
        .update_status(market.owner.id, booking.id, status_update(BookingStatus::Completed))
        .await?)
}
