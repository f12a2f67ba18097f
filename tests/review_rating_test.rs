// ABOUTME: Integration tests for reviews and provider rating aggregation
// ABOUTME: Checks review eligibility rules, the running average and the denormalized review views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_completed_booking, create_marketplace, create_test_database,
    create_test_user_with_email, new_booking,
};
use salon_booking_server::{
    errors::ErrorCode,
    models::NewReview,
    services::{
        providers::update_stats,
        reviews::{provider_reviews, user_reviews},
    },
};
use uuid::Uuid;

const DATE: &str = "2030-06-01";

fn review(provider_id: Uuid, booking_id: Uuid, rating: i64) -> NewReview {
    NewReview {
        provider_id,
        booking_id,
        rating,
        comment: "Lovely staff".to_owned(),
    }
}

#[tokio::test]
async fn test_only_completed_bookings_of_the_caller_can_be_reviewed() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    let pending = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "10:00"),
        )
        .await
        .unwrap();
    let err = db
        .reviews()
        .create(market.customer.id, review(market.provider.id, pending.id, 5))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let completed = create_completed_booking(&db, &market, DATE, "11:00")
        .await
        .unwrap();

    let stranger = create_test_user_with_email(&db, "stranger@example.com")
        .await
        .unwrap();
    let err = db
        .reviews()
        .create(stranger.id, review(market.provider.id, completed.id, 5))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = db
        .reviews()
        .create(market.customer.id, review(Uuid::new_v4(), completed.id, 5))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = db
        .reviews()
        .create(market.customer.id, review(market.provider.id, completed.id, 6))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = db
        .reviews()
        .create(market.customer.id, review(market.provider.id, Uuid::new_v4(), 4))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    db.reviews()
        .create(market.customer.id, review(market.provider.id, completed.id, 5))
        .await
        .unwrap();
    let err = db
        .reviews()
        .create(market.customer.id, review(market.provider.id, completed.id, 3))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);
}

#[tokio::test]
async fn test_rating_is_rounded_mean_of_all_reviews() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    for (time, rating) in [("09:00", 5), ("10:00", 4), ("11:00", 4)] {
        let booking = create_completed_booking(&db, &market, DATE, time)
            .await
            .unwrap();
        db.reviews()
            .create(market.customer.id, review(market.provider.id, booking.id, rating))
            .await
            .unwrap();
    }

    let provider = db.providers().require(market.provider.id).await.unwrap();
    assert_eq!(provider.review_count, 3);
    assert!((provider.rating - 4.3).abs() < 1e-9);

    let refreshed = update_stats(&db, market.owner.id, market.provider.id)
        .await
        .unwrap();
    assert_eq!(refreshed.review_count, 3);
    assert!((refreshed.rating - 4.3).abs() < 1e-9);
    assert_eq!(refreshed.total_bookings, 3);

    let err = update_stats(&db, market.customer.id, market.provider.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_review_views_mask_reviewer_and_name_the_service() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let booking = create_completed_booking(&db, &market, DATE, "14:00")
        .await
        .unwrap();
    db.reviews()
        .create(market.customer.id, review(market.provider.id, booking.id, 4))
        .await
        .unwrap();

    let public = provider_reviews(&db, market.provider.id, 20).await.unwrap();
    assert_eq!(public.len(), 1);
    let reviewer = public[0].reviewer.as_ref().unwrap();
    assert_eq!(reviewer.email, "cus***");
    assert_eq!(reviewer.name, "Test User");
    assert_eq!(public[0].service_name.as_deref(), Some("Haircut"));

    let json = serde_json::to_value(&public[0]).unwrap();
    assert_eq!(json["rating"], 4);
    assert!(json["reviewer"]["email"].as_str().unwrap().ends_with("***"));

    let own = user_reviews(&db, market.customer.id).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].provider_name.as_deref(), Some("Glow Studio"));
}
