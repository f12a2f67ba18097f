// ABOUTME: Loyalty ledger persistence: general and provider-scoped accounts plus point history
// ABOUTME: Balance changes, ledger rows and user notifications commit together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::notifications::insert_notification;
use super::transactions::SqliteTransactionGuard;
use super::{
    format_timestamp, is_unique_violation, parse_optional_uuid, parse_timestamp, parse_uuid,
    Database,
};
use crate::constants::loyalty::WELCOME_POINTS;
use crate::constants::notification_titles;
use crate::errors::{AppError, AppResult};
use crate::models::{
    credited_balance, validate_points, AddPointsRequest, LoyaltyAccount, LoyaltySummary,
    LoyaltyTransaction, LoyaltyTransactionKind, NewNotification, NotificationType, RedeemPointsRequest,
};

const ACCOUNT_COLUMNS: &str =
    "id, user_id, provider_id, points, total_visits, created_at, updated_at";
const TRANSACTION_COLUMNS: &str =
    "id, account_id, user_id, provider_id, kind, points, reason, balance_after, created_at";

impl Database {
    pub(super) async fn migrate_loyalty(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS loyalty_accounts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                provider_id TEXT,
                points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
                total_visits INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_loyalty_accounts_owner
            ON loyalty_accounts(user_id, COALESCE(provider_id, ''))
            ",
            r"
            CREATE TABLE IF NOT EXISTS loyalty_transactions (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                provider_id TEXT,
                kind TEXT NOT NULL,
                points INTEGER NOT NULL,
                reason TEXT NOT NULL DEFAULT '',
                balance_after INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_loyalty_transactions_user ON loyalty_transactions(user_id, created_at)",
        ])
        .await
    }
}

/// Loyalty ledger storage
pub struct LoyaltyManager {
    pool: SqlitePool,
}

impl LoyaltyManager {
    /// Create a new loyalty manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the general account with the welcome bonus
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_CONFLICT` when the user already has any loyalty account
    pub async fn initialize(&self, user_id: Uuid) -> AppResult<LoyaltyAccount> {
        let mut guard = begin(&self.pool).await?;
        let conn = guard.executor()?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loyalty_accounts WHERE user_id = $1")
                .bind(user_id.to_string())
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to check loyalty accounts: {e}")))?;
        if existing > 0 {
            return Err(AppError::conflict("Loyalty program already initialized"));
        }

        let account = insert_account(conn, user_id, None, WELCOME_POINTS, 0).await?;
        insert_ledger_entry(
            conn,
            &account,
            LoyaltyTransactionKind::Welcome,
            WELCOME_POINTS,
            "Welcome bonus",
        )
        .await?;

        guard.commit().await?;
        info!(user_id = %user_id, "Loyalty program initialized");
        Ok(account)
    }

    /// Credit points to a user's account at a provider, creating it on first visit
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a non-positive amount or one that would push the
    /// balance past the limit, or a database error
    pub async fn add_points(&self, request: &AddPointsRequest) -> AppResult<LoyaltyAccount> {
        validate_points(request.points)?;

        let mut guard = begin(&self.pool).await?;
        let conn = guard.executor()?;

        let account = match find_account(conn, request.user_id, Some(request.provider_id)).await? {
            None => {
                insert_account(
                    conn,
                    request.user_id,
                    Some(request.provider_id),
                    request.points,
                    1,
                )
                .await?
            }
            Some(mut account) => {
                account.points = credited_balance(account.points, request.points)?;
                account.total_visits += 1;
                account.updated_at = Utc::now();
                sqlx::query(
                    r"
                    UPDATE loyalty_accounts
                    SET points = points + $1, total_visits = total_visits + 1, updated_at = $2
                    WHERE id = $3
                    ",
                )
                .bind(request.points)
                .bind(format_timestamp(account.updated_at))
                .bind(account.id.to_string())
                .execute(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to add loyalty points: {e}")))?;
                account
            }
        };

        insert_ledger_entry(
            conn,
            &account,
            LoyaltyTransactionKind::Earn,
            request.points,
            &request.reason,
        )
        .await?;

        let draft = NewNotification::new(
            request.user_id,
            NotificationType::System,
            notification_titles::POINTS_ADDED,
            format!(
                "{} points were added to your balance. Reason: {}",
                request.points, request.reason
            ),
        )
        .related_to(account.id);
        insert_notification(conn, &draft).await?;

        guard.commit().await?;
        Ok(account)
    }

    /// Spend points from the caller's provider or general account
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_CONFLICT` when the balance is too low, leaving it unchanged
    pub async fn redeem(
        &self,
        user_id: Uuid,
        request: &RedeemPointsRequest,
    ) -> AppResult<LoyaltyAccount> {
        validate_points(request.points)?;

        let mut guard = begin(&self.pool).await?;
        let conn = guard.executor()?;

        let insufficient = || AppError::conflict("Insufficient points");
        let mut account = find_account(conn, user_id, request.provider_id)
            .await?
            .ok_or_else(insufficient)?;
        if account.points < request.points {
            return Err(insufficient());
        }

        account.updated_at = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE loyalty_accounts
            SET points = points - $1, updated_at = $2
            WHERE id = $3 AND points >= $1
            ",
        )
        .bind(request.points)
        .bind(format_timestamp(account.updated_at))
        .bind(account.id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to redeem points: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(insufficient());
        }
        account.points -= request.points;

        insert_ledger_entry(
            conn,
            &account,
            LoyaltyTransactionKind::Redeem,
            -request.points,
            &request.reason,
        )
        .await?;

        let draft = NewNotification::new(
            user_id,
            NotificationType::System,
            notification_titles::POINTS_REDEEMED,
            format!("{} points were redeemed. {}", request.points, request.reason),
        )
        .related_to(account.id);
        insert_notification(conn, &draft).await?;

        guard.commit().await?;
        Ok(account)
    }

    /// All accounts of a user, general account first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn accounts(&self, user_id: Uuid) -> AppResult<Vec<LoyaltyAccount>> {
        let sql = format!(
            r"
            SELECT {ACCOUNT_COLUMNS} FROM loyalty_accounts
            WHERE user_id = $1
            ORDER BY provider_id IS NOT NULL, created_at, rowid
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list loyalty accounts: {e}")))?;
        rows.iter().map(row_to_account).collect()
    }

    /// Latest ledger entries of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn history(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<LoyaltyTransaction>> {
        let sql = format!(
            r"
            SELECT {TRANSACTION_COLUMNS} FROM loyalty_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list loyalty history: {e}")))?;
        rows.iter().map(row_to_transaction).collect()
    }

    /// Accounts, totals, tier and recent history; `None` without any account
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn summary(&self, user_id: Uuid, history_limit: u32) -> AppResult<Option<LoyaltySummary>> {
        let accounts = self.accounts(user_id).await?;
        if accounts.is_empty() {
            return Ok(None);
        }
        let history = self.history(user_id, history_limit).await?;
        Ok(Some(LoyaltySummary::new(accounts, history)))
    }
}

async fn begin(pool: &SqlitePool) -> AppResult<SqliteTransactionGuard<'static>> {
    let transaction = pool
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
    Ok(SqliteTransactionGuard::new(transaction))
}

async fn find_account(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    provider_id: Option<Uuid>,
) -> AppResult<Option<LoyaltyAccount>> {
    let sql = format!(
        "SELECT {ACCOUNT_COLUMNS} FROM loyalty_accounts WHERE user_id = $1 AND COALESCE(provider_id, '') = $2"
    );
    sqlx::query(&sql)
        .bind(user_id.to_string())
        .bind(provider_id.map(|id| id.to_string()).unwrap_or_default())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get loyalty account: {e}")))?
        .as_ref()
        .map(row_to_account)
        .transpose()
}

async fn insert_account(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    provider_id: Option<Uuid>,
    points: i64,
    total_visits: i64,
) -> AppResult<LoyaltyAccount> {
    let now = Utc::now();
    let account = LoyaltyAccount {
        id: Uuid::new_v4(),
        user_id,
        provider_id,
        points,
        total_visits,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r"
        INSERT INTO loyalty_accounts (id, user_id, provider_id, points, total_visits, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(account.id.to_string())
    .bind(user_id.to_string())
    .bind(provider_id.map(|id| id.to_string()))
    .bind(points)
    .bind(total_visits)
    .bind(format_timestamp(now))
    .bind(format_timestamp(now))
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict("Loyalty account already exists")
        } else {
            AppError::database(format!("Failed to create loyalty account: {e}"))
        }
    })?;

    Ok(account)
}

async fn insert_ledger_entry(
    conn: &mut SqliteConnection,
    account: &LoyaltyAccount,
    kind: LoyaltyTransactionKind,
    points: i64,
    reason: &str,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO loyalty_transactions (
            id, account_id, user_id, provider_id, kind, points, reason, balance_after, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(account.id.to_string())
    .bind(account.user_id.to_string())
    .bind(account.provider_id.map(|id| id.to_string()))
    .bind(kind.as_str())
    .bind(points)
    .bind(reason)
    .bind(account.points)
    .bind(format_timestamp(Utc::now()))
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to record loyalty transaction: {e}")))?;
    Ok(())
}

fn row_to_account(row: &SqliteRow) -> AppResult<LoyaltyAccount> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(LoyaltyAccount {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        provider_id: parse_optional_uuid(row.get("provider_id"))?,
        points: row.get("points"),
        total_visits: row.get("total_visits"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_transaction(row: &SqliteRow) -> AppResult<LoyaltyTransaction> {
    let id: String = row.get("id");
    let account_id: String = row.get("account_id");
    let user_id: String = row.get("user_id");
    let kind: String = row.get("kind");
    let created_at: String = row.get("created_at");

    Ok(LoyaltyTransaction {
        id: parse_uuid(&id)?,
        account_id: parse_uuid(&account_id)?,
        user_id: parse_uuid(&user_id)?,
        provider_id: parse_optional_uuid(row.get("provider_id"))?,
        kind: kind.parse()?,
        points: row.get("points"),
        reason: row.get("reason"),
        balance_after: row.get("balance_after"),
        created_at: parse_timestamp(&created_at)?,
    })
}
