//! Bounded retries for calls to hosted model APIs.
//!
//! Both the embedding and the chat clients classify each failed attempt as
//! [`Failure::Transient`] or [`Failure::Fatal`] and hand the attempt closure to
//! [`with_retries`]. Delays follow an exponential schedule starting at 100ms.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

use crate::error::{AppError, Result};

const INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Why a single attempt failed.
#[derive(Debug)]
pub enum Failure {
    /// Throttling, 5xx or a dropped connection; another attempt may succeed.
    Transient(AppError),
    Fatal(AppError),
}

impl Failure {
    pub fn into_error(self) -> AppError {
        match self {
            Failure::Transient(error) | Failure::Fatal(error) => error,
        }
    }
}

/// Run `attempt` once, then up to `max_retries` more times while it fails
/// transiently. The last error is returned unchanged.
pub async fn with_retries<T, F, Fut>(max_retries: u32, operation: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, Failure>>,
{
    let mut schedule = delay_schedule();
    let mut retries_left = max_retries;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(Failure::Transient(error)) if retries_left > 0 => {
                let Some(delay) = schedule.next_backoff() else {
                    return Err(error);
                };
                retries_left -= 1;
                tracing::debug!(
                    operation,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    retries_left,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(failure) => return Err(failure.into_error()),
        }
    }
}

fn delay_schedule() -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: INITIAL_DELAY,
        initial_interval: INITIAL_DELAY,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_elapsed_time: None,
        ..Default::default()
    }
}
