// ABOUTME: Notification models: append-only per-user messages with a read flag
// ABOUTME: Notification type enum, stored record and the draft used by writers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Notification category
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// New or confirmed booking
    BookingConfirmed,
    /// Booking declined
    BookingRejected,
    /// Upcoming appointment
    BookingReminder,
    /// Marketing message
    Promotion,
    /// Anything else
    System,
}

impl NotificationType {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingRejected => "booking_rejected",
            Self::BookingReminder => "booking_reminder",
            Self::Promotion => "promotion",
            Self::System => "system",
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "booking_confirmed" => Ok(Self::BookingConfirmed),
            "booking_rejected" => Ok(Self::BookingRejected),
            "booking_reminder" => Ok(Self::BookingReminder),
            "promotion" => Ok(Self::Promotion),
            "system" => Ok(Self::System),
            _ => Err(AppError::invalid_input(format!(
                "Invalid notification type: {s}"
            ))),
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    /// Title
    pub title: String,
    /// Body
    pub message: String,
    /// Category
    pub notification_type: NotificationType,
    /// Read by the recipient
    pub is_read: bool,
    /// Entity the message is about
    pub related_id: Option<Uuid>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Notification about to be written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Recipient
    pub user_id: Uuid,
    /// Title
    pub title: String,
    /// Body
    pub message: String,
    /// Category
    pub notification_type: NotificationType,
    /// Entity the message is about
    pub related_id: Option<Uuid>,
}

impl NewNotification {
    /// Build a draft
    pub fn new(
        user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            notification_type,
            related_id: None,
        }
    }

    /// Attach the id of the entity this is about
    #[must_use]
    pub const fn related_to(mut self, related_id: Uuid) -> Self {
        self.related_id = Some(related_id);
        self
    }
}
