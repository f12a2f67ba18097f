// ABOUTME: Loyalty program models: accounts, ledger entries and derived tiers
// ABOUTME: Tier is computed from the balance and never stored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::loyalty::{GOLD_THRESHOLD, MAX_POINTS_BALANCE, SILVER_THRESHOLD};
use crate::errors::{AppError, AppResult};

/// Loyalty tier derived from a point balance
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    /// Below silver
    Bronze,
    /// 500 points or more
    Silver,
    /// 1000 points or more
    Gold,
}

impl LoyaltyTier {
    /// Tier for a balance
    #[must_use]
    pub const fn from_points(points: i64) -> Self {
        if points >= GOLD_THRESHOLD {
            Self::Gold
        } else if points >= SILVER_THRESHOLD {
            Self::Silver
        } else {
            Self::Bronze
        }
    }
}

impl Display for LoyaltyTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bronze => write!(f, "bronze"),
            Self::Silver => write!(f, "silver"),
            Self::Gold => write!(f, "gold"),
        }
    }
}

/// Points balance of a user, general or scoped to one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    /// Account identifier
    pub id: Uuid,
    /// Account holder
    pub user_id: Uuid,
    /// `None` for the platform-wide account
    pub provider_id: Option<Uuid>,
    /// Current balance, never negative
    pub points: i64,
    /// Visits credited to this account
    pub total_visits: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    /// Tier for the current balance
    #[must_use]
    pub const fn tier(&self) -> LoyaltyTier {
        LoyaltyTier::from_points(self.points)
    }
}

/// Ledger entry kind
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTransactionKind {
    /// Points granted on joining
    Welcome,
    /// Points earned
    Earn,
    /// Points spent
    Redeem,
}

impl LoyaltyTransactionKind {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Earn => "earn",
            Self::Redeem => "redeem",
        }
    }
}

impl FromStr for LoyaltyTransactionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "welcome" => Ok(Self::Welcome),
            "earn" => Ok(Self::Earn),
            "redeem" => Ok(Self::Redeem),
            _ => Err(AppError::invalid_input(format!(
                "Invalid loyalty transaction kind: {s}"
            ))),
        }
    }
}

/// One persisted movement of points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    /// Entry identifier
    pub id: Uuid,
    /// Account affected
    pub account_id: Uuid,
    /// Account holder
    pub user_id: Uuid,
    /// Provider of the account, `None` for general
    pub provider_id: Option<Uuid>,
    /// Entry kind
    pub kind: LoyaltyTransactionKind,
    /// Signed amount, negative on redeem
    pub points: i64,
    /// Reason given
    pub reason: String,
    /// Balance after this entry
    pub balance_after: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Loyalty overview for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltySummary {
    /// All accounts of the user
    pub accounts: Vec<LoyaltyAccount>,
    /// Sum of balances
    pub total_points: i64,
    /// Sum of visits
    pub total_bookings: i64,
    /// Tier for `total_points`
    pub current_tier: LoyaltyTier,
    /// Most recent ledger entries
    pub points_history: Vec<LoyaltyTransaction>,
}

impl LoyaltySummary {
    /// Aggregate accounts and history into a summary
    #[must_use]
    pub fn new(accounts: Vec<LoyaltyAccount>, points_history: Vec<LoyaltyTransaction>) -> Self {
        let total_points = accounts
            .iter()
            .fold(0_i64, |acc, a| acc.saturating_add(a.points));
        let total_bookings = accounts
            .iter()
            .fold(0_i64, |acc, a| acc.saturating_add(a.total_visits));
        Self {
            accounts,
            total_points,
            total_bookings,
            current_tier: LoyaltyTier::from_points(total_points),
            points_history,
        }
    }
}

/// Grant points to a user
#[derive(Debug, Clone, Deserialize)]
pub struct AddPointsRequest {
    /// Recipient
    pub user_id: Uuid,
    /// Provider granting the points
    pub provider_id: Uuid,
    /// Points, positive
    pub points: i64,
    /// Reason
    #[serde(default)]
    pub reason: String,
}

/// Spend points from the caller's balance
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemPointsRequest {
    /// Points, positive
    pub points: i64,
    /// Reason
    #[serde(default)]
    pub reason: String,
    /// Provider account, general account when absent
    pub provider_id: Option<Uuid>,
}

/// Validate a points amount
///
/// # Errors
///
/// Returns `INVALID_INPUT` for zero, negative or oversized amounts
pub fn validate_points(points: i64) -> AppResult<()> {
    if points <= 0 {
        return Err(AppError::invalid_input("Points must be greater than zero"));
    }
    if points > MAX_POINTS_BALANCE {
        return Err(AppError::invalid_input(format!(
            "Points must not exceed {MAX_POINTS_BALANCE}"
        )));
    }
    Ok(())
}

/// Balance after crediting `points`, bounded by `MAX_POINTS_BALANCE`
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the credit would push the balance past the limit
pub fn credited_balance(balance: i64, points: i64) -> AppResult<i64> {
    balance
        .checked_add(points)
        .filter(|total| *total <= MAX_POINTS_BALANCE)
        .ok_or_else(|| {
            AppError::invalid_input(format!(
                "Loyalty balance cannot exceed {MAX_POINTS_BALANCE} points"
            ))
        })
}
