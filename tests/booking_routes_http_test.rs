// ABOUTME: End-to-end HTTP tests for the marketplace booking flow through the axum router
// ABOUTME: Drives registration, provider setup, booking decisions and reviews with real JSON bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::Router;
use common::{create_authenticated_user, create_test_resources};
use helpers::axum_test::AxumTestRequest;
use salon_booking_server::routes;
use serde_json::{json, Value};

fn app(resources: &std::sync::Arc<salon_booking_server::resources::ServerResources>) -> Router {
    routes::router(resources)
}

fn provider_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Cuts and colour",
        "address": "King Fahd Road 12",
        "phone": "+15550123",
        "email": "hello@example.com",
        "latitude": 24.7136,
        "longitude": 46.6753,
        "category": "womens_salon"
    })
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let resources = create_test_resources().await.unwrap();

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "sara@example.com",
            "password": "correct-horse",
            "name": "Sara"
        }))
        .send(app(&resources))
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "sara@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some());

    let duplicate = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "sara@example.com", "password": "correct-horse" }))
        .send(app(&resources))
        .await;
    assert_eq!(duplicate.status(), 409);

    let short = AxumTestRequest::post("/api/auth/register")
        .json(&json!({ "email": "short@example.com", "password": "abc" }))
        .send(app(&resources))
        .await;
    assert_eq!(short.status(), 400);
    assert_eq!(short.error_code(), "INVALID_INPUT");

    let wrong = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "sara@example.com", "password": "wrong-horse" }))
        .send(app(&resources))
        .await;
    assert_eq!(wrong.status(), 401);

    let login = AxumTestRequest::post("/api/auth/login")
        .json(&json!({ "email": "sara@example.com", "password": "correct-horse" }))
        .send(app(&resources))
        .await;
    assert_eq!(login.status(), 200);
    let token = login.json::<Value>()["token"].as_str().unwrap().to_owned();

    let me = AxumTestRequest::get("/api/users/me")
        .auth(&format!("Bearer {token}"))
        .send(app(&resources))
        .await;
    assert_eq!(me.status(), 200);
    assert_eq!(me.json::<Value>()["name"], "Sara");
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let resources = create_test_resources().await.unwrap();

    let missing = AxumTestRequest::get("/api/bookings/mine")
        .send(app(&resources))
        .await;
    assert_eq!(missing.status(), 401);
    assert_eq!(missing.error_code(), "AUTH_REQUIRED");

    let garbage = AxumTestRequest::get("/api/notifications")
        .auth("Bearer not-a-jwt")
        .send(app(&resources))
        .await;
    assert_eq!(garbage.status(), 401);
    assert_eq!(garbage.error_code(), "AUTH_INVALID");

    // Public directory reads need no token
    let search = AxumTestRequest::get("/api/providers/search")
        .send(app(&resources))
        .await;
    assert_eq!(search.status(), 200);
    assert_eq!(search.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_booking_confirmation_and_review_flow() {
    let resources = create_test_resources().await.unwrap();
    let (_, owner) = create_authenticated_user(&resources, "owner@example.com")
        .await
        .unwrap();
    let (customer_a, alice) = create_authenticated_user(&resources, "alice@example.com")
        .await
        .unwrap();
    let (_, bob) = create_authenticated_user(&resources, "bob@example.com")
        .await
        .unwrap();

    let created = AxumTestRequest::post("/api/providers")
        .auth(&owner)
        .json(&provider_body("Palm Salon"))
        .send(app(&resources))
        .await;
    assert_eq!(created.status(), 201);
    let provider_id = created.json::<Value>()["id"].as_str().unwrap().to_owned();

    let service = AxumTestRequest::post(&format!("/api/providers/{provider_id}/services"))
        .auth(&owner)
        .json(&json!({ "name": "Blow dry", "price": 25.0, "duration_minutes": 45 }))
        .send(app(&resources))
        .await;
    assert_eq!(service.status(), 201);
    let service_id = service.json::<Value>()["id"].as_str().unwrap().to_owned();

    let slot = json!({
        "provider_id": provider_id,
        "service_id": service_id,
        "date": "2025-06-01",
        "time": "10:00"
    });

    let booked = AxumTestRequest::post("/api/bookings")
        .auth(&alice)
        .json(&slot)
        .send(app(&resources))
        .await;
    assert_eq!(booked.status(), 201);
    let booking: Value = booked.json();
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["total_price"], 25.0);
    let booking_id = booking["id"].as_str().unwrap().to_owned();

    let taken = AxumTestRequest::post("/api/bookings")
        .auth(&bob)
        .json(&slot)
        .send(app(&resources))
        .await;
    assert_eq!(taken.status(), 409);
    assert_eq!(taken.error_code(), "RESOURCE_CONFLICT");

    let pending = AxumTestRequest::get(&format!("/api/providers/{provider_id}/bookings/pending"))
        .auth(&owner)
        .send(app(&resources))
        .await;
    assert_eq!(pending.status(), 200);
    assert_eq!(pending.json::<Value>().as_array().unwrap().len(), 1);

    let stranger_decision = AxumTestRequest::put(&format!("/api/bookings/{booking_id}/status"))
        .auth(&bob)
        .json(&json!({ "status": "confirmed" }))
        .send(app(&resources))
        .await;
    assert_eq!(stranger_decision.status(), 403);

    let confirmed = AxumTestRequest::put(&format!("/api/bookings/{booking_id}/status"))
        .auth(&owner)
        .json(&json!({ "status": "confirmed", "custom_price": 20.0 }))
        .send(app(&resources))
        .await;
    assert_eq!(confirmed.status(), 200);
    let confirmed: Value = confirmed.json();
    assert_eq!(confirmed["status"], "confirmed");
    assert_eq!(confirmed["total_price"], 20.0);

    let inbox = AxumTestRequest::get("/api/notifications")
        .auth(&alice)
        .send(app(&resources))
        .await;
    assert_eq!(inbox.status(), 200);
    let inbox: Value = inbox.json();
    let confirmation = inbox
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["title"] == "Booking confirmed")
        .expect("confirmation notification");
    assert!(confirmation["message"].as_str().unwrap().contains("20"));

    // Only pending bookings can be cancelled by the customer
    let cancel = AxumTestRequest::post(&format!("/api/bookings/{booking_id}/cancel"))
        .auth(&alice)
        .send(app(&resources))
        .await;
    assert_eq!(cancel.status(), 409);

    let completed = AxumTestRequest::put(&format!("/api/bookings/{booking_id}/status"))
        .auth(&owner)
        .json(&json!({ "status": "completed" }))
        .send(app(&resources))
        .await;
    assert_eq!(completed.status(), 200);

    let review = json!({
        "provider_id": provider_id,
        "booking_id": booking_id,
        "rating": 5,
        "comment": "Perfect"
    });
    let first = AxumTestRequest::post("/api/reviews")
        .auth(&alice)
        .json(&review)
        .send(app(&resources))
        .await;
    assert_eq!(first.status(), 201);
    assert_eq!(first.json::<Value>()["user_id"], customer_a.id.to_string());

    let second = AxumTestRequest::post("/api/reviews")
        .auth(&alice)
        .json(&review)
        .send(app(&resources))
        .await;
    assert_eq!(second.status(), 409);

    let details = AxumTestRequest::get(&format!("/api/providers/{provider_id}"))
        .send(app(&resources))
        .await;
    assert_eq!(details.status(), 200);
    let details: Value = details.json();
    assert_eq!(details["rating"], 5.0);
    assert_eq!(details["review_count"], 1);

    let public_reviews = AxumTestRequest::get(&format!("/api/providers/{provider_id}/reviews"))
        .send(app(&resources))
        .await;
    assert_eq!(public_reviews.json::<Value>().as_array().unwrap().len(), 1);

    let mine = AxumTestRequest::get("/api/bookings/mine")
        .auth(&alice)
        .send(app(&resources))
        .await;
    let mine: Value = mine.json();
    assert_eq!(mine[0]["status"], "completed");
    assert_eq!(mine[0]["provider"]["name"], "Palm Salon");
}

#[tokio::test]
async fn test_unknown_ids_and_bad_bodies() {
    let resources = create_test_resources().await.unwrap();
    let (_, customer) = create_authenticated_user(&resources, "someone@example.com")
        .await
        .unwrap();

    let missing = AxumTestRequest::get(&format!("/api/providers/{}", uuid::Uuid::new_v4()))
        .send(app(&resources))
        .await;
    assert_eq!(missing.status(), 404);
    assert_eq!(missing.error_code(), "RESOURCE_NOT_FOUND");

    let bad_category = AxumTestRequest::post("/api/providers")
        .auth(&customer)
        .json(&json!({
            "name": "Nowhere",
            "address": "Street",
            "latitude": 1.0,
            "longitude": 1.0,
            "category": "spaceship"
        }))
        .send(app(&resources))
        .await;
    assert!(bad_category.status() >= 400 && bad_category.status() < 500);

    let out_of_range = AxumTestRequest::post("/api/providers")
        .auth(&customer)
        .json(&json!({
            "name": "Nowhere",
            "address": "Street",
            "latitude": 91.0,
            "longitude": 1.0,
            "category": "skincare"
        }))
        .send(app(&resources))
        .await;
    assert_eq!(out_of_range.status(), 400);
}
