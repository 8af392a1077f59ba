//! Condition-based waits over a [`BrowserSession`].

use crate::browser::session::{BrowserSession, ElementHandle, Locator};
use crate::error::{Result, VwsError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// `Ok(None)` and transient errors (element missing, interaction refused)
/// mean "not yet"; any other error ends the wait. The probe always runs at
/// least once.
pub async fn wait_until<T, F, Fut>(what: &str, timeout: Duration, poll: Duration, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => tracing::trace!("Still waiting for {}: {}", what, e),
            Err(e) => return Err(e),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(VwsError::Timeout {
                what: what.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(poll.min(timeout - elapsed)).await;
    }
}

/// Wait for `locator` to be present in the page.
pub async fn wait_for_element<S>(session: &S, locator: &Locator, timeout: Duration, poll: Duration) -> Result<ElementHandle>
where
    S: BrowserSession + ?Sized,
{
    wait_until(&locator.to_string(), timeout, poll, move || async move {
        session.find_element(locator).await.map(Some)
    })
    .await
    .map_err(|e| not_found_after(e, locator))
}

/// Turn a wait timeout into the "element never showed up" error.
pub fn not_found_after(error: VwsError, locator: &Locator) -> VwsError {
    match error {
        VwsError::Timeout { timeout, .. } => VwsError::ElementNotFound {
            locator: locator.to_string(),
            waited: timeout,
        },
        other => other,
    }
}
