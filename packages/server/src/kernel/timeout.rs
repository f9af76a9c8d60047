//! Bounded execution for store I/O.
//!
//! A slow or dead database must fail the request with `StoreError::Timeout`
//! instead of parking it forever. Dropping the returned future (client went
//! away) drops the inner query future with it.

use std::future::Future;
use std::time::Duration;

use super::StoreError;

/// Default bound for a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

/// Run `fut` for at most `after`, classifying sqlx errors for `operation`.
pub async fn bounded<T, F>(
    operation: &'static str,
    after: Duration,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(classify(operation, err)),
        Err(_) => {
            tracing::warn!(operation, ?after, "store operation timed out");
            Err(StoreError::Timeout { operation, after })
        }
    }
}

/// Map a sqlx error onto the store taxonomy.
pub fn classify(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("members_email_key") => {
            StoreError::DuplicateIdentity { field: "email" }
        }
        sqlx::Error::PoolTimedOut => StoreError::Timeout {
            operation,
            after: DEFAULT_STORE_TIMEOUT,
        },
        other => StoreError::Unavailable {
            operation,
            source: other,
        },
    }
}
