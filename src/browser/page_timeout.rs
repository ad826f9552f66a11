//! Timeout utilities for page operations
//!
//! Every suspension point in the crate is bounded. These wrappers apply
//! `tokio::time::timeout` and turn expiry into an error that names the
//! operation, so a hung CDP call never stalls a run.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run `operation` with an explicit timeout.
///
/// # Returns
/// * `Ok(T)` - Operation completed successfully
/// * `Err` - Either the operation failed or the timeout was reached
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {:.1} seconds",
            timeout.as_secs_f64()
        )),
    }
}

/// Like [`with_page_timeout`] but expiry yields `Ok(None)`.
///
/// Used for best-effort waits where the caller proceeds with partial state.
pub async fn within<F, T>(operation: F, timeout: Duration) -> Result<Option<T>>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.map(Some),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timeout_names_the_operation() {
        let err = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_secs(2),
            "Page navigation",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Page navigation timeout after 2.0 seconds");
    }

    #[tokio::test(start_paused = true)]
    async fn within_returns_none_on_expiry() {
        let value = within(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(1)
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let err = with_page_timeout(
            async { Err::<(), _>(anyhow::anyhow!("connection reset")) },
            Duration::from_secs(1),
            "Page load",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
