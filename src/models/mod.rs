// ABOUTME: Core data models for the booking marketplace
// ABOUTME: Users, providers, services, bookings, reviews, loyalty, promotions, notifications and admin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! # Data Models
//!
//! Plain serde structs shared by the database managers, the business services
//! and the HTTP layer. Enums are stored as their `snake_case` string form.

/// Admin roles and system statistics
pub mod admin;
/// Booking records and the status state machine
pub mod booking;
/// Loyalty accounts and ledger
pub mod loyalty;
/// Notification log
pub mod notification;
/// Promotions
pub mod promotion;
/// Provider directory
pub mod provider;
/// Reviews
pub mod review;
/// Service catalog
pub mod service;
/// User accounts
pub mod user;

pub use admin::{AdminRole, AdminUser, NewAdminUser, SystemStatsSnapshot};
pub use booking::{
    validate_date, validate_time, Booking, BookingStatus, BookingStatusUpdate, NewBooking,
};
pub use loyalty::{
    credited_balance, validate_points, AddPointsRequest, LoyaltyAccount, LoyaltySummary,
    LoyaltyTier, LoyaltyTransaction, LoyaltyTransactionKind, RedeemPointsRequest,
};
pub use notification::{NewNotification, Notification, NotificationType};
pub use promotion::{DiscountType, NewPromotion, Promotion, PromotionUpdate};
pub use provider::{
    DayHours, NewProvider, Provider, ProviderCategory, ProviderSearchQuery, ProviderSort,
    ProviderUpdate, WorkingHours,
};
pub use review::{round_rating, NewReview, Review};
pub use service::{NewService, Service, ServiceSearchQuery, ServiceUpdate};
pub use user::{mask_email, ProfileUpdate, ReviewerSummary, User, UserProfile};
