//! Bounded retry for actions that fail while the page is still settling.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Attempts whose action returned an error.
    pub failures: u32,
    pub succeeded: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `action` until it succeeds and `ready` reports that its effect
    /// is visible, or the attempt budget runs out.
    ///
    /// Action errors are logged and swallowed. Running out of attempts is
    /// not an error either; the caller finds out on its next step.
    pub async fn retry<A, AFut, R, RFut>(&self, label: &str, mut action: A, mut ready: R) -> RetryOutcome
    where
        A: FnMut() -> AFut,
        AFut: Future<Output = Result<()>>,
        R: FnMut() -> RFut,
        RFut: Future<Output = bool>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut failures = 0;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.delay).await;
            }

            match action().await {
                Ok(()) => {
                    if ready().await {
                        tracing::info!("{} succeeded (attempt {}/{})", label, attempt, max_attempts);
                        return RetryOutcome {
                            attempts: attempt,
                            failures,
                            succeeded: true,
                        };
                    }
                    tracing::info!(
                        "{} went through but had no effect yet (attempt {}/{})",
                        label,
                        attempt,
                        max_attempts
                    );
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}",
                        label,
                        attempt,
                        max_attempts,
                        e
                    );
                }
            }
        }

        tracing::warn!("{} gave up after {} attempts", label, max_attempts);
        RetryOutcome {
            attempts: max_attempts,
            failures,
            succeeded: false,
        }
    }
}
