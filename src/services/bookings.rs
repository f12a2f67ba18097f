// ABOUTME: Booking views with provider, service and customer snapshots attached at read time
// ABOUTME: Customer, owner, pending and admin listings share one batch enrichment pass
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use serde::Serialize;
use uuid::Uuid;

use super::ensure_provider_owner;
use crate::constants::limits::{ADMIN_BOOKINGS_DEFAULT_LIMIT, ADMIN_BOOKINGS_MAX_LIMIT};
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{Booking, BookingStatus, Provider, Service, UserProfile};

/// Provider fields shown next to a booking
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    /// Provider id
    pub id: Uuid,
    /// Business name
    pub name: String,
    /// Street address
    pub address: String,
    /// Contact phone
    pub phone: String,
    /// Cover image
    pub image_url: Option<String>,
}

impl From<&Provider> for ProviderSummary {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id,
            name: provider.name.clone(),
            address: provider.address.clone(),
            phone: provider.phone.clone(),
            image_url: provider.image_url.clone(),
        }
    }
}

/// Service fields shown next to a booking
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    /// Service id
    pub id: Uuid,
    /// Service name
    pub name: String,
    /// List price
    pub price: f64,
    /// Duration in minutes
    pub duration_minutes: i64,
}

impl From<&Service> for ServiceSummary {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            price: service.price,
            duration_minutes: service.duration_minutes,
        }
    }
}

/// Booking with the related records a caller needs
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    /// Booking record
    #[serde(flatten)]
    pub booking: Booking,
    /// Provider snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSummary>,
    /// Service snapshot, `None` once the service was deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSummary>,
    /// Customer snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Which related records to attach
#[derive(Debug, Clone, Copy)]
pub struct Enrichment {
    /// Attach provider
    pub provider: bool,
    /// Attach service
    pub service: bool,
    /// Attach customer
    pub user: bool,
}

impl Enrichment {
    /// What a customer sees on their own bookings
    pub const CUSTOMER: Self = Self {
        provider: true,
        service: true,
        user: false,
    };
    /// What a provider owner sees
    pub const OWNER: Self = Self {
        provider: false,
        service: true,
        user: true,
    };
    /// Everything, for the back-office
    pub const ALL: Self = Self {
        provider: true,
        service: true,
        user: true,
    };
}

/// Attach related records using one batch query per kind
///
/// # Errors
///
/// Returns an error if a batch query fails
pub async fn enrich(
    database: &Database,
    bookings: Vec<Booking>,
    enrichment: Enrichment,
) -> AppResult<Vec<BookingView>> {
    let providers = if enrichment.provider {
        let ids: Vec<Uuid> = bookings.iter().map(|b| b.provider_id).collect();
        database.providers_by_ids(&ids).await?
    } else {
        Default::default()
    };
    let services = if enrichment.service {
        let ids: Vec<Uuid> = bookings.iter().map(|b| b.service_id).collect();
        database.services_by_ids(&ids).await?
    } else {
        Default::default()
    };
    let users = if enrichment.user {
        let ids: Vec<Uuid> = bookings.iter().map(|b| b.user_id).collect();
        database.users_by_ids(&ids).await?
    } else {
        Default::default()
    };

    Ok(bookings
        .into_iter()
        .map(|booking| BookingView {
            provider: providers.get(&booking.provider_id).map(ProviderSummary::from),
            service: services.get(&booking.service_id).map(ServiceSummary::from),
            user: users.get(&booking.user_id).map(UserProfile::from),
            booking,
        })
        .collect())
}

/// A customer's bookings, newest first
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn user_bookings(database: &Database, user_id: Uuid) -> AppResult<Vec<BookingView>> {
    let bookings = database.bookings().list_by_user(user_id).await?;
    enrich(database, bookings, Enrichment::CUSTOMER).await
}

/// Bookings of an owned provider, newest first, optionally one status only
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when the caller does not own the provider
pub async fn provider_bookings(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
    status: Option<BookingStatus>,
) -> AppResult<Vec<BookingView>> {
    ensure_provider_owner(database, provider_id, owner_id).await?;
    let bookings = database
        .bookings()
        .list_by_provider(provider_id, status)
        .await?;
    enrich(database, bookings, Enrichment::OWNER).await
}

/// Every booking for the back-office with a clamped limit
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn all_bookings(
    database: &Database,
    status: Option<BookingStatus>,
    limit: Option<u32>,
) -> AppResult<Vec<BookingView>> {
    let limit = admin_limit(limit);
    let bookings = database.bookings().list_all(status, limit).await?;
    enrich(database, bookings, Enrichment::ALL).await
}

fn admin_limit(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(ADMIN_BOOKINGS_DEFAULT_LIMIT)
        .clamp(1, ADMIN_BOOKINGS_MAX_LIMIT)
}
