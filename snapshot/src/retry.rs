use std::{future::Future, time::Duration};

use tracing::warn;

use crate::error::SnapshotError;

pub const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY_MS: u64 = 500;

/// Run `op` with bounded exponential backoff. Only transient errors (429,
/// connect, timeout) are retried; the last error is returned once the
/// attempt budget is spent.
pub async fn with_backoff<T, F, Fut>(mut op: F) -> Result<T, SnapshotError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SnapshotError>>,
{
    let mut delay = Duration::from_millis(BASE_DELAY_MS);
    for attempt in 1..=MAX_ATTEMPTS {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                warn!("transient error (attempt {attempt}/{MAX_ATTEMPTS}), retrying in {delay:?}: {err}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(err),
        }
    }
    unreachable!("loop returns on the final attempt")
}
