// Retry logic with exponential backoff
//
// Used only inside HTTP service implementations. Strategies never retry;
// with `max_retries = 0` a failed request is returned on the first attempt.

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

const BASE_DELAY_MS: u64 = 1000;

/// Execute `f` up to `1 + max_retries` times with exponential backoff
pub async fn with_retry<F, Fut, T>(max_retries: u32, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let attempts = max_retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(e);
                }

                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt - 1));
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {:?}: {}",
                    attempt,
                    attempts,
                    delay,
                    e
                );
                sleep(delay).await;
            }
        }
    }
}
