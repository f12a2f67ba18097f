// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the in-process HTTP request builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
