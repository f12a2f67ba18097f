// ABOUTME: Main library entry point for the salon and clinic booking platform
// ABOUTME: Exposes the persistence layer, domain services and the axum HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![deny(unsafe_code)]

//! # Salon Booking Server
//!
//! A marketplace API connecting service providers (salons, clinics) with
//! customers.
//!
//! ## Features
//!
//! - **Provider directory**: category, text, distance, rating and price search
//! - **Booking workflow**: slot conflict detection and a strict status machine
//! - **Reviews**: one review per completed booking with a running average rating
//! - **Loyalty**: per-provider and general point balances with a persisted ledger
//! - **Promotions**: date-bounded discounts
//! - **Back-office**: role-gated statistics, moderation and bulk deletes
//!
//! ## Architecture
//!
//! - **Models**: domain records and request payloads with validation
//! - **Database**: one manager per concern over a shared `SQLite` pool
//! - **Services**: ownership checks, denormalized views and aggregations
//! - **Routes**: thin axum handlers per domain
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use salon_booking_server::config::environment::ServerConfig;
//! use salon_booking_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Salon booking server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT issuing, bearer authentication and password hashing
pub mod auth;

/// Environment-based server configuration
pub mod config;

/// Application constants grouped by domain
pub mod constants;

/// `SQLite` persistence: pool, migrations and per-concern managers
pub mod database;

/// Unified error type and HTTP error responses
pub mod errors;

/// Great-circle distance helpers
pub mod geo;

/// Structured logging setup and event helpers
pub mod logging;

/// Request tracing, CORS and admin authorization guards
pub mod middleware;

/// Domain models and request payloads
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Domain service layer
pub mod services;
