use std::future::Future;
use std::time::Duration;

use crate::errors::AuthError;

/// Deadline applied uniformly to every store operation.
pub const DB_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs a store future under [`DB_TIMEOUT`]. An operation that misses the
/// deadline fails with [`AuthError::StoreTimeout`] instead of hanging; the
/// abandoned future is dropped and its connection returns to the pool.
pub async fn with_deadline<T, F>(fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(DB_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AuthError::Persist(e)),
        Err(_) => Err(AuthError::StoreTimeout),
    }
}
