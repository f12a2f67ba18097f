// ABOUTME: Transaction management with RAII guards and retry on SQLite lock contention
// ABOUTME: Every multi-row mutation runs through TransactionGuard, contended ones through retry_transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Transaction management with RAII guards and retry patterns
//!
//! - [`TransactionGuard`] rolls back automatically when dropped uncommitted.
//! - [`retry_transaction`] re-runs a whole transactional closure with
//!   exponential backoff when `SQLite` reports the database as locked or busy.
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = TransactionGuard::new(pool.begin().await?);
//!     sqlx::query("INSERT INTO bookings ...").execute(guard.executor()?).await?;
//!     sqlx::query("INSERT INTO notifications ...").execute(guard.executor()?).await?;
//!     guard.commit().await
//! }, 3).await?;
//! ```
//!
//! Domain errors (conflicts, validation, not found) are never retried.

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Retry a transactional operation when it fails on lock contention
///
/// Backoff doubles per attempt starting at 20ms. Only `DATABASE_ERROR`s whose
/// message reports locking, busy or timeout conditions are retried.
///
/// # Errors
///
/// Returns the last error after `max_retries` attempts, or the first
/// non-retryable error immediately
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_retries: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if !is_retryable_error(&e) {
                    return Err(e);
                }
                if attempts >= max_retries {
                    error!(
                        attempts = attempts,
                        max_retries = max_retries,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                    return Err(e);
                }

                let backoff_ms = 10 * (1_u64 << attempts);
                warn!(
                    attempt = attempts,
                    max_retries = max_retries,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction hit lock contention, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Check if an error is transient lock contention
fn is_retryable_error(error: &AppError) -> bool {
    if error.code != ErrorCode::DatabaseError {
        return false;
    }

    let error_lower = error.message.to_lowercase();

    if error_lower.contains("unique constraint")
        || error_lower.contains("foreign key constraint")
        || error_lower.contains("check constraint")
        || error_lower.contains("not null constraint")
    {
        return false;
    }

    error_lower.contains("database is locked")
        || error_lower.contains("locked")
        || error_lower.contains("busy")
        || error_lower.contains("timeout")
        || error_lower.contains("timed out")
}

/// RAII guard for database transactions ensuring automatic rollback on drop
///
/// `commit` consumes the guard. Dropping it without committing rolls the
/// transaction back.
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a transaction obtained from `pool.begin()`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("TransactionGuard created");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
                self.committed = true;
                debug!("TransactionGuard committed successfully");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Connection to run queries inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already consumed
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            debug!("TransactionGuard dropped without commit - rolling back");
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_on_locked_database() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_transaction(
            || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AppError::database("database is locked"))
                } else {
                    Ok(7)
                }
            },
            3,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_domain_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: AppResult<()> = retry_transaction(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::conflict("Time slot is already booked"))
            },
            3,
        )
        .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::ResourceConflict);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: AppResult<()> = retry_transaction(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::database("database is busy"))
            },
            3,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
