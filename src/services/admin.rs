// ABOUTME: Back-office operations: platform statistics, moderation toggles and bulk deletes
// ABOUTME: Callers pass through the admin guard before any function here runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::constants::limits::{
    RECENT_ACTIVITY_DAYS, SYSTEM_STATS_RECENT_ACTIVITY, SYSTEM_STATS_TOP_PROVIDERS,
};
use crate::constants::notification_titles;
use crate::database::admin::BulkDeleteReport;
use crate::database::{today, Database};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{
    AdminUser, Booking, NewAdminUser, NewNotification, NotificationType, Provider,
    SystemStatsSnapshot, UserProfile,
};

/// Platform totals
#[derive(Debug, Clone, Serialize)]
pub struct StatsOverview {
    /// Registered users
    pub total_users: i64,
    /// Providers
    pub total_providers: i64,
    /// Bookings
    pub total_bookings: i64,
    /// Revenue of completed bookings
    pub total_revenue: f64,
    /// Bookings dated today
    pub today_bookings: i64,
    /// Users created in the last 30 days
    pub new_users_this_month: i64,
}

/// Provider with its booking count
#[derive(Debug, Clone, Serialize)]
pub struct TopProviderEntry {
    /// Provider, `None` if it vanished between queries
    pub provider: Option<Provider>,
    /// Bookings against the provider
    pub booking_count: i64,
}

/// Latest platform activity
#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    /// Newest bookings
    pub recent_bookings: Vec<Booking>,
    /// Newest users
    pub recent_users: Vec<UserProfile>,
}

/// Live platform statistics
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    /// Totals
    pub overview: StatsOverview,
    /// Booking count per status
    pub bookings_by_status: BTreeMap<String, i64>,
    /// Busiest providers
    pub top_providers: Vec<TopProviderEntry>,
    /// Latest activity
    pub recent_activity: RecentActivity,
}

/// Provider with its owner for the back-office list
#[derive(Debug, Clone, Serialize)]
pub struct AdminProviderView {
    /// Provider record
    #[serde(flatten)]
    pub provider: Provider,
    /// Owner profile
    pub owner: Option<UserProfile>,
}

/// Compute live platform statistics
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn system_stats(database: &Database) -> AppResult<SystemStats> {
    let bookings = database.bookings();
    let since = Utc::now() - Duration::days(RECENT_ACTIVITY_DAYS);

    let overview = StatsOverview {
        total_users: database.users().count().await?,
        total_providers: database.providers().count().await?,
        total_bookings: bookings.count(None).await?,
        total_revenue: bookings.completed_revenue(None, None).await?,
        today_bookings: bookings.count_on_date(None, &today()).await?,
        new_users_this_month: database.users().count_created_since(since).await?,
    };

    let ranked = bookings
        .top_providers_by_count(SYSTEM_STATS_TOP_PROVIDERS)
        .await?;
    let ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
    let mut providers = database.providers_by_ids(&ids).await?;
    let top_providers = ranked
        .into_iter()
        .map(|(id, booking_count)| TopProviderEntry {
            provider: providers.remove(&id),
            booking_count,
        })
        .collect();

    let recent_activity = RecentActivity {
        recent_bookings: bookings.recent(SYSTEM_STATS_RECENT_ACTIVITY).await?,
        recent_users: database
            .users()
            .list(SYSTEM_STATS_RECENT_ACTIVITY, 0)
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect(),
    };

    Ok(SystemStats {
        overview,
        bookings_by_status: bookings.status_counts(None).await?,
        top_providers,
        recent_activity,
    })
}

/// Persist today's snapshot; a second call on the same day returns the first
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn save_snapshot(database: &Database, admin_id: Uuid) -> AppResult<SystemStatsSnapshot> {
    let now = Utc::now();
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::internal("Failed to compute start of day"))?
        .and_utc();
    let bookings = database.bookings();

    let snapshot = SystemStatsSnapshot {
        id: Uuid::new_v4(),
        date: today(),
        total_users: database.users().count().await?,
        total_providers: database.providers().count().await?,
        total_bookings: bookings.count(None).await?,
        total_revenue: bookings.completed_revenue(None, None).await?,
        active_users: bookings
            .count_active_users_since(now - Duration::days(RECENT_ACTIVITY_DAYS))
            .await?,
        new_signups: database
            .users()
            .count_created_between(midnight, midnight + Duration::days(1))
            .await?,
        created_at: now,
    };

    let saved = database.admin().save_snapshot(&snapshot).await?;
    AppLogger::log_admin_action(&admin_id.to_string(), "save_stats_snapshot", Some(&saved.date));
    Ok(saved)
}

/// Newest providers with their owners
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn admin_providers(database: &Database, limit: u32) -> AppResult<Vec<AdminProviderView>> {
    let providers = database.providers().list_all(limit).await?;
    let owner_ids: Vec<Uuid> = providers.iter().map(|p| p.owner_id).collect();
    let owners = database.users_by_ids(&owner_ids).await?;
    Ok(providers
        .into_iter()
        .map(|provider| AdminProviderView {
            owner: owners.get(&provider.owner_id).map(UserProfile::from),
            provider,
        })
        .collect())
}

/// Newest users
///
/// # Errors
///
/// Returns an error if the query fails
pub async fn admin_users(database: &Database, limit: u32, offset: u32) -> AppResult<Vec<UserProfile>> {
    Ok(database
        .users()
        .list(limit, offset)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect())
}

/// Activate or deactivate a provider and tell its owner
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown provider
pub async fn set_provider_active(
    database: &Database,
    admin_id: Uuid,
    provider_id: Uuid,
    is_active: bool,
) -> AppResult<Provider> {
    let provider = database.providers().set_active(provider_id, is_active).await?;
    let (title, message) = if is_active {
        (
            notification_titles::PROVIDER_ACTIVATED,
            "Your provider account has been activated",
        )
    } else {
        (
            notification_titles::PROVIDER_DEACTIVATED,
            "Your provider account has been temporarily deactivated",
        )
    };
    notify_owner(database, &provider, title, message).await?;
    AppLogger::log_admin_action(
        &admin_id.to_string(),
        if is_active { "activate_provider" } else { "deactivate_provider" },
        Some(&provider_id.to_string()),
    );
    Ok(provider)
}

/// Show or hide a provider in public listings and tell its owner
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown provider
pub async fn set_provider_visible(
    database: &Database,
    admin_id: Uuid,
    provider_id: Uuid,
    is_visible: bool,
) -> AppResult<Provider> {
    let provider = database
        .providers()
        .set_visible(provider_id, is_visible)
        .await?;
    let (title, message) = if is_visible {
        (
            notification_titles::PROVIDER_SHOWN,
            "Your provider is now visible to customers",
        )
    } else {
        (
            notification_titles::PROVIDER_HIDDEN,
            "Your provider has been temporarily hidden from public listings",
        )
    };
    notify_owner(database, &provider, title, message).await?;
    AppLogger::log_admin_action(
        &admin_id.to_string(),
        if is_visible { "show_provider" } else { "hide_provider" },
        Some(&provider_id.to_string()),
    );
    Ok(provider)
}

async fn notify_owner(
    database: &Database,
    provider: &Provider,
    title: &str,
    message: &str,
) -> AppResult<()> {
    let draft = NewNotification::new(provider.owner_id, NotificationType::System, title, message)
        .related_to(provider.id);
    database.notifications().create(&draft).await?;
    Ok(())
}

/// Delete one provider with every dependent row, open bookings included
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown provider
pub async fn delete_provider(
    database: &Database,
    admin_id: Uuid,
    provider_id: Uuid,
) -> AppResult<BTreeMap<String, u64>> {
    let details = database.providers().delete_cascade(provider_id, true).await?;
    AppLogger::log_admin_action(
        &admin_id.to_string(),
        "delete_provider",
        Some(&provider_id.to_string()),
    );
    Ok(details)
}

/// Delete every provider and its dependents
///
/// # Errors
///
/// Returns an error if the transaction fails, leaving every table untouched
pub async fn delete_all_providers(database: &Database, admin_id: Uuid) -> AppResult<BulkDeleteReport> {
    let report = database.admin().delete_all_providers().await?;
    AppLogger::log_bulk_delete(&admin_id.to_string(), "providers", report.deleted_count);
    Ok(report)
}

/// Delete all business data, keeping users and admins
///
/// # Errors
///
/// Returns an error if the transaction fails, leaving every table untouched
pub async fn delete_all_data(database: &Database, admin_id: Uuid) -> AppResult<BulkDeleteReport> {
    let report = database.admin().delete_all_data().await?;
    AppLogger::log_bulk_delete(&admin_id.to_string(), "all_data", report.deleted_count);
    Ok(report)
}

/// Register an existing user as an admin
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown user and `RESOURCE_CONFLICT`
/// when the user is already an admin
pub async fn add_admin(
    database: &Database,
    granted_by: Uuid,
    input: NewAdminUser,
) -> AppResult<AdminUser> {
    database.users().require(input.user_id).await?;
    let admin = database.admin().create(input).await?;
    AppLogger::log_admin_action(
        &granted_by.to_string(),
        "add_admin",
        Some(&admin.user_id.to_string()),
    );
    Ok(admin)
}
