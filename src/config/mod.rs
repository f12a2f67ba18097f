// ABOUTME: Configuration module root
// ABOUTME: Re-exports environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

/// Environment variable driven configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, ServerConfig,
};
