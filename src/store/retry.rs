use std::{future::Future, time::Duration};

use tracing::warn;

use crate::utils::clock::Clock;

use super::error::StoreResult;

/// How long to wait between attempts while the backend is not ready.
pub const TRANSIENT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Attempts made before a transient error is handed to the caller.
pub const TRANSIENT_RETRY_ATTEMPTS: usize = 5;

/// Runs `operation` until it either succeeds or fails with a non transient error. Transient
/// failures are waited out, up to [TRANSIENT_RETRY_ATTEMPTS] attempts.
pub async fn retry_transient<T, F, Fut>(clock: &dyn Clock, mut operation: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(e) if e.is_transient() && attempt < TRANSIENT_RETRY_ATTEMPTS => {
                warn!("Attempt {attempt} failed with {e}, waiting");
                clock.sleep(TRANSIENT_RETRY_DELAY).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
