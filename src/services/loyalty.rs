// ABOUTME: Loyalty point grants gated on provider ownership or admin role
// ABOUTME: Balance changes themselves run in the loyalty manager's transactions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use tracing::info;
use uuid::Uuid;

use super::ensure_owner_or_admin;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{validate_points, AddPointsRequest, LoyaltyAccount};

/// Grant points to a customer on behalf of a provider
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a non-positive amount, `RESOURCE_NOT_FOUND`
/// for an unknown user or provider and `PERMISSION_DENIED` unless the
/// caller owns the provider or is an admin
pub async fn add_points(
    database: &Database,
    caller_id: Uuid,
    request: &AddPointsRequest,
) -> AppResult<LoyaltyAccount> {
    validate_points(request.points)?;
    ensure_owner_or_admin(database, request.provider_id, caller_id).await?;
    database.users().require(request.user_id).await?;

    let account = database.loyalty().add_points(request).await?;
    info!(
        granted_by = %caller_id,
        user_id = %request.user_id,
        provider_id = %request.provider_id,
        points = request.points,
        balance = account.points,
        "Loyalty points granted"
    );
    Ok(account)
}
