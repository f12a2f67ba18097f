// ABOUTME: Provider directory logic: multi-stage search, top ranking, details and owner CRUD
// ABOUTME: Search annotates distance and price range and sorts with one stable comparator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::reviews::{provider_reviews, ProviderReviewView};
use super::{ensure_owner_or_admin, ensure_provider_owner};
use crate::constants::limits::{
    PROVIDER_REVIEWS_DEFAULT_LIMIT, TOP_PROVIDERS_DEFAULT_LIMIT, TOP_PROVIDERS_SERVICES_PREVIEW,
};
use crate::constants::search::MIN_NAME_MATCHES;
use crate::database::{today, Database};
use crate::errors::{AppError, AppResult};
use crate::geo::{compare_distance, haversine_km};
use crate::models::{
    NewProvider, Promotion, Provider, ProviderCategory, ProviderSearchQuery, ProviderSort,
    ProviderUpdate, Service,
};

/// Provider annotated for search results
#[derive(Debug, Clone, Serialize)]
pub struct ProviderListing {
    /// Provider record
    #[serde(flatten)]
    pub provider: Provider,
    /// Kilometres from the caller, `None` without a caller position
    pub distance: Option<f64>,
    /// Active services, narrowed by the price filter
    pub services: Vec<Service>,
    /// Cheapest active service, 0 without services
    pub min_price: f64,
    /// Most expensive active service, 0 without services
    pub max_price: f64,
}

/// Provider entry in the top providers list
#[derive(Debug, Clone, Serialize)]
pub struct TopProvider {
    /// Provider record
    #[serde(flatten)]
    pub provider: Provider,
    /// `rating * ln(1 + total_bookings)`
    pub score: f64,
    /// First few active services
    pub services: Vec<Service>,
}

/// Public provider page
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDetails {
    /// Provider record
    #[serde(flatten)]
    pub provider: Provider,
    /// Active services
    pub services: Vec<Service>,
    /// Newest reviews
    pub reviews: Vec<ProviderReviewView>,
    /// Promotions running today
    pub promotions: Vec<Promotion>,
}

/// Booking counters for an owner's provider
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderStats {
    /// All bookings
    pub total_bookings: i64,
    /// Awaiting a decision
    pub pending_bookings: i64,
    /// Accepted and upcoming
    pub confirmed_bookings: i64,
    /// Done
    pub completed_bookings: i64,
    /// Revenue of completed bookings
    pub total_revenue: f64,
}

/// Provider as listed for its owner
#[derive(Debug, Clone, Serialize)]
pub struct OwnedProvider {
    /// Provider record
    #[serde(flatten)]
    pub provider: Provider,
    /// Every service, inactive included
    pub services: Vec<Service>,
    /// Booking counters
    pub stats: ProviderStats,
}

/// Search active and visible providers
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn search_providers(
    database: &Database,
    query: &ProviderSearchQuery,
) -> AppResult<Vec<ProviderListing>> {
    let text = query
        .search_query
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    let mut candidates = match text {
        Some(text) => text_search(database, text).await?,
        None => database.providers().list_listed(query.category).await?,
    };

    if let Some(category) = query.category {
        candidates.retain(|p| p.category == category);
    }
    if let Some(min_rating) = query.min_rating {
        candidates.retain(|p| p.rating >= min_rating);
    }

    let position = query.caller_position();
    let mut located: Vec<(Provider, Option<f64>)> = candidates
        .into_iter()
        .map(|provider| {
            let distance =
                position.map(|from| haversine_km(from, (provider.latitude, provider.longitude)));
            (provider, distance)
        })
        .collect();
    if let (Some(max_distance), Some(_)) = (query.max_distance, position) {
        located.retain(|(_, distance)| distance.is_some_and(|d| d <= max_distance));
    }

    let ids: Vec<Uuid> = located.iter().map(|(p, _)| p.id).collect();
    let mut services = database.services().active_for_providers(&ids).await?;

    let mut listings: Vec<ProviderListing> = located
        .into_iter()
        .filter_map(|(provider, distance)| {
            let all = services.remove(&provider.id).unwrap_or_default();
            let (min_price, max_price) = price_range(&all);
            let offered: Vec<Service> = match query.max_price {
                Some(limit) => all.into_iter().filter(|s| s.price <= limit).collect(),
                None => all,
            };
            if query.max_price.is_some() && offered.is_empty() {
                return None;
            }
            Some(ProviderListing {
                provider,
                distance,
                services: offered,
                min_price,
                max_price,
            })
        })
        .collect();

    sort_listings(&mut listings, query.sort_by, position.is_some());
    Ok(listings)
}

/// Name prefix match first, then a description and address scan when the
/// name match is thin
async fn text_search(database: &Database, text: &str) -> AppResult<Vec<Provider>> {
    let terms: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    let mut hits = database.providers().search_by_name(&terms).await?;
    if hits.len() < MIN_NAME_MATCHES {
        let seen: HashSet<Uuid> = hits.iter().map(|p| p.id).collect();
        let extra = database.providers().search_by_text(text).await?;
        hits.extend(extra.into_iter().filter(|p| !seen.contains(&p.id)));
    }
    Ok(hits)
}

fn price_range(services: &[Service]) -> (f64, f64) {
    let mut prices = services.iter().map(|s| s.price);
    let Some(first) = prices.next() else {
        return (0.0, 0.0);
    };
    prices.fold((first, first), |(lo, hi), price| (lo.min(price), hi.max(price)))
}

/// Sort search results in place, keeping input order among equal keys
///
/// Without an explicit sort key, results are ordered by distance when the
/// caller position is known and left untouched otherwise.
pub fn sort_listings(listings: &mut [ProviderListing], sort_by: Option<ProviderSort>, has_position: bool) {
    let sort = match sort_by {
        Some(sort) => sort,
        None if has_position => ProviderSort::Distance,
        None => return,
    };
    listings.sort_by(|a, b| compare_listings(a, b, sort));
}

fn compare_listings(a: &ProviderListing, b: &ProviderListing, sort: ProviderSort) -> Ordering {
    match sort {
        ProviderSort::Distance => compare_distance(a.distance, b.distance),
        ProviderSort::Rating => b.provider.rating.total_cmp(&a.provider.rating),
        ProviderSort::Newest => b.provider.created_at.cmp(&a.provider.created_at),
        ProviderSort::Name => a
            .provider
            .name
            .to_lowercase()
            .cmp(&b.provider.name.to_lowercase()),
    }
}

/// Popularity score, zero for unrated or never-booked providers
#[must_use]
pub fn popularity_score(rating: f64, total_bookings: i64) -> f64 {
    let bookings = total_bookings.max(0) as f64;
    rating * bookings.ln_1p()
}

/// Rated providers ranked by popularity score
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn top_providers(
    database: &Database,
    category: Option<ProviderCategory>,
    limit: Option<u32>,
) -> AppResult<Vec<TopProvider>> {
    let limit = limit.unwrap_or(TOP_PROVIDERS_DEFAULT_LIMIT) as usize;
    let mut ranked: Vec<(Provider, f64)> = database
        .providers()
        .list_rated(category)
        .await?
        .into_iter()
        .map(|p| {
            let score = popularity_score(p.rating, p.total_bookings);
            (p, score)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);

    let ids: Vec<Uuid> = ranked.iter().map(|(p, _)| p.id).collect();
    let mut services = database.services().active_for_providers(&ids).await?;

    Ok(ranked
        .into_iter()
        .map(|(provider, score)| {
            let mut preview = services.remove(&provider.id).unwrap_or_default();
            preview.truncate(TOP_PROVIDERS_SERVICES_PREVIEW);
            TopProvider {
                provider,
                score,
                services: preview,
            }
        })
        .collect())
}

/// Public provider page, hidden once an admin deactivates the provider
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for unknown or inactive providers
pub async fn provider_details(database: &Database, provider_id: Uuid) -> AppResult<ProviderDetails> {
    let provider = database
        .providers()
        .get(provider_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found("Provider").with_resource_id(provider_id.to_string()))?;

    let services = database
        .services()
        .list_by_provider(provider_id, false)
        .await?;
    let reviews = provider_reviews(database, provider_id, PROVIDER_REVIEWS_DEFAULT_LIMIT).await?;
    let promotions = database
        .promotions()
        .running_on(&today(), Some(provider_id))
        .await?;

    Ok(ProviderDetails {
        provider,
        services,
        reviews,
        promotions,
    })
}

/// Providers owned by a user with all services and booking counters
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn owner_providers(database: &Database, owner_id: Uuid) -> AppResult<Vec<OwnedProvider>> {
    let providers = database.providers().list_by_owner(owner_id).await?;
    let mut owned = Vec::with_capacity(providers.len());
    for provider in providers {
        let services = database
            .services()
            .list_by_provider(provider.id, true)
            .await?;
        let stats = provider_stats(database, provider.id).await?;
        owned.push(OwnedProvider {
            provider,
            services,
            stats,
        });
    }
    Ok(owned)
}

/// Booking counters and completed revenue for one provider
///
/// # Errors
///
/// Returns an error if a query fails
pub async fn provider_stats(database: &Database, provider_id: Uuid) -> AppResult<ProviderStats> {
    let counts = database.bookings().status_counts(Some(provider_id)).await?;
    let revenue = database
        .bookings()
        .completed_revenue(Some(provider_id), None)
        .await?;
    Ok(stats_from_counts(&counts, revenue))
}

fn stats_from_counts(counts: &BTreeMap<String, i64>, total_revenue: f64) -> ProviderStats {
    let count = |status: &str| counts.get(status).copied().unwrap_or(0);
    ProviderStats {
        total_bookings: counts.values().sum(),
        pending_bookings: count("pending"),
        confirmed_bookings: count("confirmed"),
        completed_bookings: count("completed"),
        total_revenue,
    }
}

/// Register a provider owned by the caller
///
/// # Errors
///
/// Returns `INVALID_INPUT` for bad fields and `RESOURCE_CONFLICT` for a
/// duplicate name and address
pub async fn create_provider(
    database: &Database,
    owner_id: Uuid,
    input: NewProvider,
) -> AppResult<Provider> {
    input.validate()?;
    let provider = database.providers().create(owner_id, input).await?;
    info!(provider_id = %provider.id, owner_id = %owner_id, "Provider created");
    Ok(provider)
}

/// Apply an owner's partial update
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-owners and `INVALID_INPUT` for bad fields
pub async fn update_provider(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
    update: ProviderUpdate,
) -> AppResult<Provider> {
    let mut provider = ensure_provider_owner(database, provider_id, owner_id).await?;
    update.apply_to(&mut provider)?;
    database.providers().update(&provider).await?;
    Ok(provider)
}

/// Owner delete, refused while open bookings exist
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` for non-owners and `RESOURCE_CONFLICT` when
/// pending or confirmed bookings remain
pub async fn delete_provider(
    database: &Database,
    owner_id: Uuid,
    provider_id: Uuid,
) -> AppResult<BTreeMap<String, u64>> {
    ensure_provider_owner(database, provider_id, owner_id).await?;
    database.providers().delete_cascade(provider_id, false).await
}

/// Recount rating, review count and bookings from source rows
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` unless the caller owns the provider or is an admin
pub async fn update_stats(
    database: &Database,
    caller_id: Uuid,
    provider_id: Uuid,
) -> AppResult<Provider> {
    ensure_owner_or_admin(database, provider_id, caller_id).await?;
    database.providers().recompute_stats(provider_id).await
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::WorkingHours;

    fn listing(name: &str, rating: f64, distance: Option<f64>, age_days: i64) -> ProviderListing {
        let created_at = Utc::now() - Duration::days(age_days);
        ProviderListing {
            provider: Provider {
                id: Uuid::new_v4(),
                name: name.to_owned(),
                description: String::new(),
                address: String::new(),
                phone: String::new(),
                email: String::new(),
                latitude: 0.0,
                longitude: 0.0,
                category: ProviderCategory::MensSalon,
                working_hours: WorkingHours::default(),
                owner_id: Uuid::new_v4(),
                is_active: true,
                is_visible: true,
                rating,
                review_count: 0,
                total_bookings: 0,
                image_url: None,
                tags: vec![],
                created_at,
                updated_at: created_at,
            },
            distance,
            services: vec![],
            min_price: 0.0,
            max_price: 0.0,
        }
    }

    fn names(listings: &[ProviderListing]) -> Vec<&str> {
        listings.iter().map(|l| l.provider.name.as_str()).collect()
    }

    #[test]
    fn test_distance_sort_puts_unknown_last() {
        let mut listings = vec![
            listing("far", 4.0, Some(12.0), 1),
            listing("unknown", 4.0, None, 1),
            listing("near", 4.0, Some(1.5), 1),
        ];
        sort_listings(&mut listings, Some(ProviderSort::Distance), true);
        assert_eq!(names(&listings), vec!["near", "far", "unknown"]);
    }

    #[test]
    fn test_default_sort_depends_on_position() {
        let mut listings = vec![
            listing("b", 4.0, Some(5.0), 1),
            listing("a", 4.0, Some(1.0), 1),
        ];
        sort_listings(&mut listings, None, false);
        assert_eq!(names(&listings), vec!["b", "a"]);

        sort_listings(&mut listings, None, true);
        assert_eq!(names(&listings), vec!["a", "b"]);
    }

    #[test]
    fn test_rating_newest_and_name_sorts() {
        let mut listings = vec![
            listing("beta", 3.5, None, 3),
            listing("Alpha", 4.8, None, 10),
            listing("gamma", 4.1, None, 1),
        ];

        sort_listings(&mut listings, Some(ProviderSort::Rating), false);
        assert_eq!(names(&listings), vec!["Alpha", "gamma", "beta"]);

        sort_listings(&mut listings, Some(ProviderSort::Newest), false);
        assert_eq!(names(&listings), vec!["gamma", "beta", "Alpha"]);

        sort_listings(&mut listings, Some(ProviderSort::Name), false);
        assert_eq!(names(&listings), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_rating_sort_is_stable() {
        let mut listings = vec![
            listing("first", 4.0, None, 1),
            listing("second", 4.0, None, 1),
            listing("third", 4.5, None, 1),
        ];
        sort_listings(&mut listings, Some(ProviderSort::Rating), false);
        assert_eq!(names(&listings), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_popularity_score() {
        assert!(popularity_score(4.0, 0).abs() < f64::EPSILON);
        assert!(popularity_score(0.0, 50).abs() < f64::EPSILON);
        assert!(popularity_score(4.5, 100) > popularity_score(4.5, 10));
        assert!(popularity_score(5.0, 10) > popularity_score(4.0, 10));
    }

    #[test]
    fn test_stats_from_counts() {
        let counts = BTreeMap::from([
            ("pending".to_owned(), 2),
            ("confirmed".to_owned(), 1),
            ("completed".to_owned(), 4),
            ("cancelled".to_owned(), 3),
        ]);
        let stats = stats_from_counts(&counts, 120.0);
        assert_eq!(stats.total_bookings, 10);
        assert_eq!(stats.pending_bookings, 2);
        assert_eq!(stats.confirmed_bookings, 1);
        assert_eq!(stats.completed_bookings, 4);
    }
}
