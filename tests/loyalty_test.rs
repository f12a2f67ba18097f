// ABOUTME: Integration tests for the loyalty program
// ABOUTME: Covers enrollment, granting and redeeming points, the ledger and tier derivation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_marketplace, create_test_database, create_test_user_with_email};
use salon_booking_server::{
    constants::loyalty::{MAX_POINTS_BALANCE, WELCOME_POINTS},
    errors::ErrorCode,
    models::{AddPointsRequest, LoyaltyTier, LoyaltyTransactionKind, RedeemPointsRequest},
    services::loyalty::add_points,
};
use uuid::Uuid;

fn grant(user_id: Uuid, provider_id: Uuid, points: i64) -> AddPointsRequest {
    AddPointsRequest {
        user_id,
        provider_id,
        points,
        reason: "Visit".to_owned(),
    }
}

fn spend(points: i64, provider_id: Option<Uuid>) -> RedeemPointsRequest {
    RedeemPointsRequest {
        points,
        reason: "Discount".to_owned(),
        provider_id,
    }
}

#[tokio::test]
async fn test_initialize_grants_welcome_bonus_once() {
    let db = create_test_database().await.unwrap();
    let user = create_test_user_with_email(&db, "loyal@example.com")
        .await
        .unwrap();

    assert!(db.loyalty().summary(user.id, 50).await.unwrap().is_none());

    let account = db.loyalty().initialize(user.id).await.unwrap();
    assert_eq!(account.points, WELCOME_POINTS);
    assert!(account.provider_id.is_none());
    assert_eq!(account.tier(), LoyaltyTier::Bronze);

    let err = db.loyalty().initialize(user.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let history = db.loyalty().history(user.id, 50).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, LoyaltyTransactionKind::Welcome);
    assert_eq!(history[0].balance_after, WELCOME_POINTS);
}

#[tokio::test]
async fn test_owner_grants_points_per_provider() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();

    let first = add_points(&db, market.owner.id, &grant(market.customer.id, market.provider.id, 300))
        .await
        .unwrap();
    assert_eq!(first.points, 300);
    assert_eq!(first.total_visits, 1);
    assert_eq!(first.provider_id, Some(market.provider.id));

    let second = add_points(&db, market.owner.id, &grant(market.customer.id, market.provider.id, 250))
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.points, 550);
    assert_eq!(second.total_visits, 2);
    assert_eq!(second.tier(), LoyaltyTier::Silver);

    let err = add_points(&db, market.customer.id, &grant(market.customer.id, market.provider.id, 10))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = add_points(&db, market.owner.id, &grant(market.customer.id, market.provider.id, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = add_points(&db, market.owner.id, &grant(Uuid::new_v4(), market.provider.id, 10))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let inbox = db.notifications().list(market.customer.id, 10).await.unwrap();
    assert_eq!(inbox.len(), 2);
}

#[tokio::test]
async fn test_grants_cannot_overflow_the_balance() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    let customer = market.customer.id;
    let provider = market.provider.id;

    let err = add_points(&db, market.owner.id, &grant(customer, provider, i64::MAX))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let full = add_points(&db, market.owner.id, &grant(customer, provider, MAX_POINTS_BALANCE))
        .await
        .unwrap();
    assert_eq!(full.points, MAX_POINTS_BALANCE);

    let err = add_points(&db, market.owner.id, &grant(customer, provider, MAX_POINTS_BALANCE))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // The rejected grant leaves balance and ledger untouched
    let summary = db.loyalty().summary(customer, 50).await.unwrap().unwrap();
    assert_eq!(summary.total_points, MAX_POINTS_BALANCE);
    assert_eq!(summary.total_bookings, 1);
    assert_eq!(summary.points_history.len(), 1);
}

#[tokio::test]
async fn test_redeem_never_overdraws() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    db.loyalty().initialize(market.customer.id).await.unwrap();
    add_points(&db, market.owner.id, &grant(market.customer.id, market.provider.id, 40))
        .await
        .unwrap();

    let err = db
        .loyalty()
        .redeem(market.customer.id, &spend(50, Some(market.provider.id)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let err = db
        .loyalty()
        .redeem(market.customer.id, &spend(10, Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    let general = db
        .loyalty()
        .redeem(market.customer.id, &spend(60, None))
        .await
        .unwrap();
    assert_eq!(general.points, WELCOME_POINTS - 60);

    let provider_account = db
        .loyalty()
        .redeem(market.customer.id, &spend(40, Some(market.provider.id)))
        .await
        .unwrap();
    assert_eq!(provider_account.points, 0);
}

#[tokio::test]
async fn test_summary_totals_accounts_and_ledger() {
    let db = create_test_database().await.unwrap();
    let market = create_marketplace(&db).await.unwrap();
    db.loyalty().initialize(market.customer.id).await.unwrap();
    add_points(&db, market.owner.id, &grant(market.customer.id, market.provider.id, 950))
        .await
        .unwrap();
    db.loyalty()
        .redeem(market.customer.id, &spend(25, None))
        .await
        .unwrap();

    let summary = db
        .loyalty()
        .summary(market.customer.id, 50)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.accounts.len(), 2);
    assert!(summary.accounts[0].provider_id.is_none());
    assert_eq!(summary.total_points, WELCOME_POINTS + 950 - 25);
    assert_eq!(summary.total_bookings, 1);
    assert_eq!(summary.current_tier, LoyaltyTier::Gold);

    let kinds: Vec<_> = summary.points_history.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LoyaltyTransactionKind::Redeem,
            LoyaltyTransactionKind::Earn,
            LoyaltyTransactionKind::Welcome,
        ]
    );
    assert_eq!(summary.points_history[0].points, -25);

    let limited = db
        .loyalty()
        .summary(market.customer.id, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(limited.points_history.len(), 1);
}
