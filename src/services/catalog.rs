// ABOUTME: Service catalog and promotion management under provider ownership
// ABOUTME: Every mutation resolves the owning provider before touching rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use uuid::Uuid;

use super::ensure_provider_owner;
use crate::database::{today, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{
    NewPromotion, NewService, Promotion, PromotionUpdate, Service, ServiceSearchQuery,
    ServiceUpdate,
};

// ================================================================
// Services
// ================================================================

/// Add a service to an owned provider
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-owners and `INVALID_INPUT` for bad fields
pub async fn create_service(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
    input: NewService,
) -> AppResult<Service> {
    ensure_provider_owner(database, provider_id, owner_id).await?;
    input.validate()?;
    database.services().create(provider_id, input).await
}

/// Apply an owner's partial update to a service
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND`, `PERMISSION_DENIED` or `INVALID_INPUT`
pub async fn update_service(
    database: &Database,
    owner_id: Uuid,
    service_id: Uuid,
    update: ServiceUpdate,
) -> AppResult<Service> {
    let mut service = database.services().require(service_id).await?;
    ensure_provider_owner(database, service.provider_id, owner_id).await?;
    update.apply_to(&mut service)?;
    database.services().update(&service).await?;
    Ok(service)
}

/// Remove a service that has no open bookings
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND`, `PERMISSION_DENIED` or `RESOURCE_CONFLICT`
pub async fn delete_service(database: &Database, owner_id: Uuid, service_id: Uuid) -> AppResult<()> {
    let service = database.services().require(service_id).await?;
    ensure_provider_owner(database, service.provider_id, owner_id).await?;
    database.services().delete(service_id).await
}

/// Services of a provider; inactive ones only for the owner
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when `include_inactive` is asked by anyone but the owner
pub async fn services_for_provider(
    database: &Database,
    provider_id: Uuid,
    include_inactive: bool,
    caller_id: Option<Uuid>,
) -> AppResult<Vec<Service>> {
    if include_inactive {
        let caller = caller_id.ok_or_else(AppError::auth_required)?;
        ensure_provider_owner(database, provider_id, caller).await?;
    }
    database
        .services()
        .list_by_provider(provider_id, include_inactive)
        .await
}

/// Active services matching a name fragment
///
/// # Errors
///
/// Returns an error if the query fails
pub async fn search_services(
    database: &Database,
    query: &ServiceSearchQuery,
) -> AppResult<Vec<Service>> {
    database.services().search(query).await
}

// ================================================================
// Promotions
// ================================================================

/// Create a promotion for an owned provider
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-owners and `INVALID_INPUT` for bad fields
pub async fn create_promotion(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
    input: NewPromotion,
) -> AppResult<Promotion> {
    ensure_provider_owner(database, provider_id, owner_id).await?;
    input.validate()?;
    database.promotions().create(provider_id, input).await
}

/// Every promotion of an owned provider, newest first
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-owners
pub async fn provider_promotions(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
) -> AppResult<Vec<Promotion>> {
    ensure_provider_owner(database, provider_id, owner_id).await?;
    database.promotions().list_by_provider(provider_id).await
}

/// Apply an owner's partial update to a promotion
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND`, `PERMISSION_DENIED` or `INVALID_INPUT`
pub async fn update_promotion(
    database: &Database,
    owner_id: Uuid,
    promotion_id: Uuid,
    update: PromotionUpdate,
) -> AppResult<Promotion> {
    let mut promotion = database.promotions().require(promotion_id).await?;
    ensure_provider_owner(database, promotion.provider_id, owner_id).await?;
    update.apply_to(&mut promotion)?;
    database.promotions().update(&promotion).await?;
    Ok(promotion)
}

/// Delete a promotion of an owned provider
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `PERMISSION_DENIED`
pub async fn delete_promotion(
    database: &Database,
    owner_id: Uuid,
    promotion_id: Uuid,
) -> AppResult<()> {
    let promotion = database.promotions().require(promotion_id).await?;
    ensure_provider_owner(database, promotion.provider_id, owner_id).await?;
    database.promotions().delete(promotion_id).await
}

/// Promotions running today, optionally for one provider
///
/// # Errors
///
/// Returns an error if the query fails
pub async fn active_promotions(
    database: &Database,
    provider_id: Option<Uuid>,
) -> AppResult<Vec<Promotion>> {
    database.promotions().running_on(&today(), provider_id).await
}
