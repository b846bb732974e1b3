//! Time-boxing for individual browser steps

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run one session step under `timeout`
///
/// Expiry is reported as `"<step> timeout after N seconds"` so navigation
/// errors name the strategy that ran out of time. Errors from the step
/// itself pass through unchanged.
pub async fn with_page_timeout<F, T>(step: F, timeout: Duration, step_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, step).await {
        Ok(outcome) => outcome,
        Err(_) => Err(anyhow::anyhow!(
            "{step_name} timeout after {:.1} seconds",
            timeout.as_secs_f64()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reports_timeout_with_name() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, anyhow::Error>(())
        };
        let err = with_page_timeout(slow, Duration::from_secs(2), "Primary navigation")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Primary navigation timeout after 2.0 seconds");
    }

    #[tokio::test]
    async fn passes_through_operation_errors() {
        let failing = async { Err::<(), _>(anyhow::anyhow!("net::ERR_NAME_NOT_RESOLVED")) };
        let err = with_page_timeout(failing, Duration::from_secs(2), "load").await.unwrap_err();
        assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    }
}
