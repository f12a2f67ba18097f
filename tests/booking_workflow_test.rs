// ABOUTME: Integration tests for the booking workflow against a real SQLite database
// ABOUTME: Covers slot conflicts, the status machine, cancellation, notifications and views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_completed_booking, create_file_database, create_marketplace, create_test_database,
    create_test_provider, create_test_service, create_test_user_with_email, new_booking,
    status_update,
};
use salon_booking_server::{
    constants::notification_titles,
    errors::ErrorCode,
    models::{BookingStatus, BookingStatusUpdate, NotificationType},
    services::bookings::{provider_bookings, user_bookings},
};

const DATE: &str = "2030-05-14";

#[tokio::test]
async fn test_create_booking_starts_pending_and_notifies_owner() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    let booking = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "10:00"),
        )
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert!((booking.total_price - 50.0).abs() < f64::EPSILON);
    assert_eq!(booking.user_id, market.customer.id);
    assert!(booking.custom_price.is_none());

    let provider = db.providers().require(market.provider.id).await.unwrap();
    assert_eq!(provider.total_bookings, 1);

    let inbox = db.notifications().list(market.owner.id, 10).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, notification_titles::NEW_BOOKING);
    assert_eq!(inbox[0].related_id, Some(booking.id));
    assert!(!inbox[0].is_read);
}

#[tokio::test]
async fn test_same_slot_conflicts_until_released() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let other = create_test_user_with_email(&db, "other@example.com")
        .await
        .unwrap();
    let input = new_booking(&market.provider, &market.service, DATE, "11:30");

    let first = db.bookings().create(market.customer.id, &input).await.unwrap();

    let err = db.bookings().create(other.id, &input).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    // A different time on the same day is free
    let mut later = input.clone();
    later.time = "12:00".to_owned();
    db.bookings().create(other.id, &later).await.unwrap();

    // Rejection releases the slot
    db.bookings()
        .update_status(market.owner.id, first.id, status_update(BookingStatus::Rejected))
        .await
        .unwrap();
    let retaken = db.bookings().create(other.id, &input).await.unwrap();
    assert_eq!(retaken.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    let bad_date = new_booking(&market.provider, &market.service, "14/05/2030", "10:00");
    let err = db.bookings().create(market.customer.id, &bad_date).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let bad_time = new_booking(&market.provider, &market.service, DATE, "25:00");
    let err = db.bookings().create(market.customer.id, &bad_time).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // Service of another provider
    let rival = create_test_provider(&db, market.owner.id, "Rival Salon")
        .await
        .unwrap();
    let rival_service = create_test_service(&db, rival.id, "Shave", 20.0)
        .await
        .unwrap();
    let mismatched = new_booking(&market.provider, &rival_service, DATE, "10:00");
    let err = db.bookings().create(market.customer.id, &mismatched).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // Deactivated provider stops accepting bookings
    db.providers().set_active(market.provider.id, false).await.unwrap();
    let input = new_booking(&market.provider, &market.service, DATE, "10:00");
    let err = db.bookings().create(market.customer.id, &input).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_status_machine_rejects_illegal_edges() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let booking = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "09:00"),
        )
        .await
        .unwrap();

    // pending -> completed skips confirmation
    let err = db
        .bookings()
        .update_status(market.owner.id, booking.id, status_update(BookingStatus::Completed))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    // pending is never a target
    let err = db
        .bookings()
        .update_status(market.owner.id, booking.id, status_update(BookingStatus::Pending))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // only the owner may move the booking
    let err = db
        .bookings()
        .update_status(market.customer.id, booking.id, status_update(BookingStatus::Confirmed))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let completed = create_completed_booking(&db, &market, DATE, "15:00")
        .await
        .unwrap();
    let err = db
        .bookings()
        .update_status(market.owner.id, completed.id, status_update(BookingStatus::Cancelled))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let inbox = db.notifications().list(market.customer.id, 20).await.unwrap();
    let done = inbox
        .iter()
        .find(|n| n.title == notification_titles::SERVICE_COMPLETED)
        .expect("completion notification");
    assert_eq!(done.notification_type, NotificationType::BookingConfirmed);
    assert_eq!(done.related_id, Some(completed.id));
}

#[tokio::test]
async fn test_confirm_with_custom_price_and_notes() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let booking = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "13:00"),
        )
        .await
        .unwrap();

    let confirmed = db
        .bookings()
        .update_status(
            market.owner.id,
            booking.id,
            BookingStatusUpdate {
                status: BookingStatus::Confirmed,
                custom_price: Some(42.5),
                provider_notes: Some("Bring your own towel".to_owned()),
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(confirmed.id, booking.id);
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.custom_price, Some(42.5));
    assert!((confirmed.total_price - 42.5).abs() < f64::EPSILON);

    let stored = db.bookings().get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.provider_notes.as_deref(), Some("Bring your own towel"));
    assert!((stored.total_price - 42.5).abs() < f64::EPSILON);

    let inbox = db.notifications().list(market.customer.id, 10).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, notification_titles::BOOKING_CONFIRMED);
    assert!(inbox[0].message.contains("42.5"));

    let err = db
        .bookings()
        .update_status(
            market.owner.id,
            booking.id,
            BookingStatusUpdate {
                status: BookingStatus::Completed,
                custom_price: Some(0.0),
                provider_notes: None,
                rejection_reason: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_customer_cancellation_rules() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let booking = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "16:00"),
        )
        .await
        .unwrap();

    let err = db.bookings().cancel(market.owner.id, booking.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let cancelled = db.bookings().cancel(market.customer.id, booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let err = db.bookings().cancel(market.customer.id, booking.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let owner_inbox = db.notifications().list(market.owner.id, 10).await.unwrap();
    assert!(owner_inbox
        .iter()
        .any(|n| n.title == notification_titles::BOOKING_CANCELLED));

    let confirmed = db
        .bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "17:00"),
        )
        .await
        .unwrap();
    db.bookings()
        .update_status(market.owner.id, confirmed.id, status_update(BookingStatus::Confirmed))
        .await
        .unwrap();
    let err = db.bookings().cancel(market.customer.id, confirmed.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);
}

#[tokio::test]
async fn test_booking_views_are_enriched_per_audience() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    db.bookings()
        .create(
            market.customer.id,
            &new_booking(&market.provider, &market.service, DATE, "10:00"),
        )
        .await
        .unwrap();

    let mine = user_bookings(&db, market.customer.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].provider.as_ref().unwrap().name, "Glow Studio");
    assert_eq!(mine[0].service.as_ref().unwrap().name, "Haircut");
    assert!(mine[0].user.is_none());

    let owned = provider_bookings(&db, market.owner.id, market.provider.id, None)
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].user.as_ref().unwrap().id, market.customer.id);

    let pending = provider_bookings(
        &db,
        market.owner.id,
        market.provider.id,
        Some(BookingStatus::Confirmed),
    )
    .await
    .unwrap();
    assert!(pending.is_empty());

    let err = provider_bookings(&db, market.customer.id, market.provider.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_one_slot_admit_one_booking() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_file_database(&dir).await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    let mut customers = Vec::new();
    for i in 0..6 {
        customers.push(
            create_test_user_with_email(&db, &format!("racer{i}@example.com"))
                .await
                .unwrap(),
        );
    }

    let input = new_booking(&market.provider, &market.service, DATE, "18:00");
    let handles: Vec<_> = customers
        .into_iter()
        .map(|customer| {
            let db = db.clone();
            let input = input.clone();
            tokio::spawn(async move { db.bookings().create(customer.id, &input).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);

    let held = db
        .bookings()
        .list_by_provider(market.provider.id, None)
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.time == "18:00" && b.status.holds_slot())
        .count();
    assert_eq!(held, 1);
}
