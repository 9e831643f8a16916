//! Caller-driven cancellation for storage operations.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Fail with [`CoreError::Cancelled`] if `cancel` has already fired.
pub fn ensure_active(cancel: &CancellationToken) -> Result<(), CoreError> {
    if cancel.is_cancelled() {
        Err(CoreError::Cancelled)
    } else {
        Ok(())
    }
}

/// Run `fut` unless `cancel` fires first.
///
/// The token is checked before the future is polled. If it fires while the
/// future is pending, the future is dropped and `Cancelled` is returned.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    ensure_active(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CoreError::Cancelled),
        result = fut => result,
    }
}
