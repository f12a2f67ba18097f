// ABOUTME: Integration tests for promotions and the notification inbox
// ABOUTME: Checks date-window activity, owner-only management and per-user inbox isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::{create_marketplace, create_test_database, new_booking};
use salon_booking_server::{
    errors::ErrorCode,
    models::{DiscountType, NewNotification, NewPromotion, NotificationType, PromotionUpdate},
    services::{
        catalog::{
            active_promotions, create_promotion, delete_promotion, provider_promotions,
            update_promotion,
        },
        providers::provider_details,
    },
};
use uuid::Uuid;

fn day(offset: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

fn promotion(title: &str, from: i64, until: i64) -> NewPromotion {
    NewPromotion {
        title: title.to_owned(),
        description: String::new(),
        discount_type: DiscountType::Percentage,
        discount_value: 15.0,
        valid_from: day(from),
        valid_until: day(until),
        usage_limit: None,
    }
}

#[tokio::test]
async fn test_only_running_promotions_are_active() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let owner = market.owner.id;
    let provider = market.provider.id;

    let running = create_promotion(&db, owner, provider, promotion("Now", -1, 1))
        .await
        .unwrap();
    let today_only = create_promotion(&db, owner, provider, promotion("Today", 0, 0))
        .await
        .unwrap();
    create_promotion(&db, owner, provider, promotion("Later", 2, 9))
        .await
        .unwrap();
    create_promotion(&db, owner, provider, promotion("Over", -9, -2))
        .await
        .unwrap();

    let active = active_promotions(&db, None).await.unwrap();
    let ids: Vec<Uuid> = active.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&running.id));
    assert!(ids.contains(&today_only.id));

    assert!(active_promotions(&db, Some(Uuid::new_v4()))
        .await
        .unwrap()
        .is_empty());

    let all = provider_promotions(&db, owner, provider).await.unwrap();
    assert_eq!(all.len(), 4);

    let details = provider_details(&db, provider).await.unwrap();
    assert_eq!(details.promotions.len(), 2);
    assert_eq!(details.services.len(), 1);

    // Deactivating removes it from the active list
    update_promotion(
        &db,
        owner,
        running.id,
        PromotionUpdate {
            is_active: Some(false),
            ..PromotionUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(active_promotions(&db, Some(provider)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_promotion_management_is_owner_only_and_validated() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let owner = market.owner.id;
    let provider = market.provider.id;

    let err = create_promotion(&db, market.customer.id, provider, promotion("Nope", 0, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let mut too_generous = promotion("Free", 0, 1);
    too_generous.discount_value = 150.0;
    let err = create_promotion(&db, owner, provider, too_generous)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = create_promotion(&db, owner, provider, promotion("Backwards", 3, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let created = create_promotion(&db, owner, provider, promotion("Spring", 0, 5))
        .await
        .unwrap();

    let err = update_promotion(
        &db,
        owner,
        created.id,
        PromotionUpdate {
            valid_until: Some(day(-1)),
            ..PromotionUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let updated = update_promotion(
        &db,
        owner,
        created.id,
        PromotionUpdate {
            title: Some("Spring sale".to_owned()),
            discount_value: Some(25.0),
            ..PromotionUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.title, "Spring sale");
    assert!((updated.discount_value - 25.0).abs() < f64::EPSILON);

    let err = delete_promotion(&db, market.customer.id, created.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    delete_promotion(&db, owner, created.id).await.unwrap();
    let err = delete_promotion(&db, owner, created.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_inbox_read_flags_and_isolation() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    for time in ["10:00", "11:00", "12:00"] {
        db.bookings()
            .create(
                market.customer.id,
                &new_booking(&market.provider, &market.service, "2030-09-09", time),
            )
            .await
            .unwrap();
    }

    let notifications = db.notifications();
    let owner = market.owner.id;
    assert_eq!(notifications.unread_count(owner).await.unwrap(), 3);

    let inbox = notifications.list(owner, 50).await.unwrap();
    assert_eq!(inbox.len(), 3);
    assert!(inbox[0].created_at >= inbox[2].created_at);

    // Another user cannot touch the owner's notifications
    let err = notifications
        .mark_read(market.customer.id, inbox[0].id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    let err = notifications
        .delete(market.customer.id, inbox[0].id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    notifications.mark_read(owner, inbox[0].id).await.unwrap();
    assert_eq!(notifications.unread_count(owner).await.unwrap(), 2);

    assert_eq!(notifications.mark_all_read(owner).await.unwrap(), 2);
    assert_eq!(notifications.unread_count(owner).await.unwrap(), 0);

    notifications.delete(owner, inbox[1].id).await.unwrap();
    assert_eq!(notifications.list(owner, 50).await.unwrap().len(), 2);
    assert_eq!(notifications.list(owner, 1).await.unwrap().len(), 1);

    let direct = notifications
        .create(
            &NewNotification::new(
                market.customer.id,
                NotificationType::Promotion,
                "Weekend offer",
                "Twenty percent off all treatments",
            )
            .related_to(market.provider.id),
        )
        .await
        .unwrap();
    assert_eq!(direct.notification_type, NotificationType::Promotion);
    assert_eq!(direct.related_id, Some(market.provider.id));
    assert!(!direct.is_read);
}
