// ABOUTME: Integration tests for provider directory search, ranking and lifecycle
// ABOUTME: Exercises text, category, rating, distance and price filters plus owner deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_completed_booking, create_marketplace, create_test_database, create_test_service,
    create_test_user_with_email, new_booking, new_provider,
};
use salon_booking_server::{
    database::Database,
    errors::ErrorCode,
    models::{NewReview, Provider, ProviderCategory, ProviderSearchQuery, ProviderSort},
    services::providers::{
        create_provider, delete_provider, provider_details, search_providers, top_providers,
    },
};
use uuid::Uuid;

// Riyadh city centre and two points roughly 5 km and 40 km away
const CENTRE: (f64, f64) = (24.7136, 46.6753);
const NEAR: (f64, f64) = (24.7586, 46.6753);
const FAR: (f64, f64) = (25.0736, 46.6753);

struct Directory {
    near: Provider,
    centre: Provider,
    far: Provider,
}

async fn seed_directory(db: &Database) -> Directory {
    let owner = create_test_user_with_email(db, "directory@example.com")
        .await
        .unwrap();

    let near = db
        .providers()
        .create(
            owner.id,
            new_provider("bella Nails", ProviderCategory::WomensSalon, NEAR.0, NEAR.1),
        )
        .await
        .unwrap();
    let centre = db
        .providers()
        .create(
            owner.id,
            new_provider("Atlas Barbers", ProviderCategory::MensSalon, CENTRE.0, CENTRE.1),
        )
        .await
        .unwrap();
    let far = db
        .providers()
        .create(
            owner.id,
            new_provider("Clear Skin Clinic", ProviderCategory::Skincare, FAR.0, FAR.1),
        )
        .await
        .unwrap();

    create_test_service(db, near.id, "Manicure", 80.0).await.unwrap();
    create_test_service(db, near.id, "Gel polish", 120.0).await.unwrap();
    create_test_service(db, centre.id, "Beard trim", 30.0).await.unwrap();
    create_test_service(db, far.id, "Facial", 300.0).await.unwrap();

    Directory { near, centre, far }
}

fn names(listings: &[salon_booking_server::services::providers::ProviderListing]) -> Vec<&str> {
    listings.iter().map(|l| l.provider.name.as_str()).collect()
}

#[tokio::test]
async fn test_default_order_is_insertion_without_position() {
    let db = create_test_database().await.unwrap();
    seed_directory(&db).await;

    let results = search_providers(&db, &ProviderSearchQuery::default())
        .await
        .unwrap();
    assert_eq!(
        names(&results),
        vec!["bella Nails", "Atlas Barbers", "Clear Skin Clinic"]
    );
    assert!(results.iter().all(|l| l.distance.is_none()));
}

#[tokio::test]
async fn test_position_sorts_by_distance_and_limits_radius() {
    let db = create_test_database().await.unwrap();
    seed_directory(&db).await;

    let query = ProviderSearchQuery {
        latitude: Some(CENTRE.0),
        longitude: Some(CENTRE.1),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &query).await.unwrap();
    assert_eq!(
        names(&results),
        vec!["Atlas Barbers", "bella Nails", "Clear Skin Clinic"]
    );
    let near_distance = results[1].distance.unwrap();
    assert!((4.0..6.0).contains(&near_distance), "{near_distance}");

    let bounded = ProviderSearchQuery {
        max_distance: Some(10.0),
        ..query
    };
    let results = search_providers(&db, &bounded).await.unwrap();
    assert_eq!(names(&results), vec!["Atlas Barbers", "bella Nails"]);
}

#[tokio::test]
async fn test_max_distance_is_ignored_without_position() {
    let db = create_test_database().await.unwrap();
    seed_directory(&db).await;

    let unbounded = search_providers(&db, &ProviderSearchQuery::default())
        .await
        .unwrap();
    let query = ProviderSearchQuery {
        max_distance: Some(10.0),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &query).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(names(&results), names(&unbounded));
    assert!(results.iter().all(|listing| listing.distance.is_none()));
}

#[tokio::test]
async fn test_name_sort_is_case_insensitive() {
    let db = create_test_database().await.unwrap();
    seed_directory(&db).await;

    let query = ProviderSearchQuery {
        sort_by: Some(ProviderSort::Name),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &query).await.unwrap();
    assert_eq!(
        names(&results),
        vec!["Atlas Barbers", "bella Nails", "Clear Skin Clinic"]
    );
}

#[tokio::test]
async fn test_category_and_price_filters() {
    let db = create_test_database().await.unwrap();
    let directory = seed_directory(&db).await;

    let query = ProviderSearchQuery {
        category: Some(ProviderCategory::WomensSalon),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &query).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider.id, directory.near.id);
    assert!((results[0].min_price - 80.0).abs() < f64::EPSILON);
    assert!((results[0].max_price - 120.0).abs() < f64::EPSILON);
    assert_eq!(results[0].services.len(), 2);

    let affordable = ProviderSearchQuery {
        max_price: Some(100.0),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &affordable).await.unwrap();
    assert_eq!(names(&results), vec!["bella Nails", "Atlas Barbers"]);
    assert_eq!(results[0].services.len(), 1);
    assert_eq!(results[0].services[0].name, "Manicure");
}

#[tokio::test]
async fn test_text_search_matches_names_then_addresses() {
    let db = create_test_database().await.unwrap();
    let directory = seed_directory(&db).await;

    let query = ProviderSearchQuery {
        search_query: Some("clin".to_owned()),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &query).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider.id, directory.far.id);

    let by_address = ProviderSearchQuery {
        search_query: Some("street".to_owned()),
        ..ProviderSearchQuery::default()
    };
    assert_eq!(search_providers(&db, &by_address).await.unwrap().len(), 3);

    let with_category = ProviderSearchQuery {
        search_query: Some("street".to_owned()),
        category: Some(ProviderCategory::MensSalon),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &with_category).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider.id, directory.centre.id);
}

#[tokio::test]
async fn test_hidden_and_inactive_providers_are_not_listed() {
    let db = create_test_database().await.unwrap();
    let directory = seed_directory(&db).await;

    db.providers().set_visible(directory.near.id, false).await.unwrap();
    db.providers().set_active(directory.far.id, false).await.unwrap();

    let results = search_providers(&db, &ProviderSearchQuery::default())
        .await
        .unwrap();
    assert_eq!(names(&results), vec!["Atlas Barbers"]);

    // Hidden providers keep their public page, inactive ones lose it
    provider_details(&db, directory.near.id).await.unwrap();
    let err = provider_details(&db, directory.far.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_min_rating_and_top_providers() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let directory = seed_directory(&db).await;

    let booking = create_completed_booking(&db, &market, "2030-07-01", "10:00")
        .await
        .unwrap();
    db.reviews()
        .create(
            market.customer.id,
            NewReview {
                provider_id: market.provider.id,
                booking_id: booking.id,
                rating: 4,
                comment: String::new(),
            },
        )
        .await
        .unwrap();

    let query = ProviderSearchQuery {
        min_rating: Some(3.5),
        ..ProviderSearchQuery::default()
    };
    let results = search_providers(&db, &query).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider.id, market.provider.id);

    let top = top_providers(&db, None, None).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].provider.id, market.provider.id);
    assert!(top[0].score > 0.0);
    assert!(top.iter().all(|t| t.provider.id != directory.far.id));

    let none = top_providers(&db, Some(ProviderCategory::Skincare), Some(5))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_duplicate_provider_is_a_conflict() {
    let db = create_test_database().await.unwrap();
    let owner = create_test_user_with_email(&db, "dup@example.com").await.unwrap();

    let input = new_provider("Twin Salon", ProviderCategory::BeautyClinic, 24.0, 46.0);
    create_provider(&db, owner.id, input.clone()).await.unwrap();

    let mut shouted = input.clone();
    shouted.name = "TWIN SALON".to_owned();
    let err = create_provider(&db, owner.id, shouted).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let mut invalid = input;
    invalid.latitude = 123.0;
    invalid.name = "Elsewhere".to_owned();
    let err = create_provider(&db, owner.id, invalid).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_owner_delete_waits_for_open_bookings() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    let booking = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, "2030-08-01", "10:00"),
        )
        .await
        .unwrap();

    let err = delete_provider(&db, market.customer.id, market.provider.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = delete_provider(&db, market.owner.id, market.provider.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    db.bookings().cancel(market.customer.id, booking.id).await.unwrap();
    let details = delete_provider(&db, market.owner.id, market.provider.id)
        .await
        .unwrap();
    assert_eq!(details.get("services"), Some(&1));
    assert_eq!(details.get("bookings"), Some(&1));

    assert!(db.providers().get(market.provider.id).await.unwrap().is_none());
    let err = delete_provider(&db, market.owner.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
