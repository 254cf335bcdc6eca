//! Bounded retry over a fixed delay schedule.
//!
//! [`retry_with_schedule`] wraps a fallible async operation and retries on
//! transport-level failures only. Provider-level rejections, deserialization
//! failures, and every other error are returned immediately: retrying them
//! cannot change the outcome. Only the readiness probe retries at all —
//! data calls through the client are single-attempt by contract.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

/// Returns `true` for errors worth retrying after a delay: network-level
/// failures (connect, reset, timeout) where the service may simply not be
/// reachable yet.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    matches!(err, PlacesError::Transport(_))
}

/// Runs `operation`, sleeping through `schedule` between failed attempts.
///
/// Total attempts = `schedule.len() + 1`. With the readiness schedule
/// (500 ms then 1000 ms steps) and three attempts:
///
/// | Attempt | Sleep before next attempt |
/// |---------|---------------------------|
/// | 1       | 500 ms                    |
/// | 2       | 1000 ms                   |
/// | 3       | — (last error returned)   |
///
/// Non-retriable errors are returned immediately without sleeping.
pub(crate) async fn retry_with_schedule<T, F, Fut>(
    schedule: &[Duration],
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut step = 0usize;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || step >= schedule.len() {
                    return Err(err);
                }
                let delay = schedule[step];
                tracing::warn!(
                    attempt = step + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "mapping service not reachable — retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                step += 1;
            }
        }
    }
}

/// The fixed readiness backoff: one 500 ms step, then 1000 ms steps.
pub(crate) fn readiness_schedule(max_attempts: u32) -> Vec<Duration> {
    (1..max_attempts)
        .map(|i| {
            if i == 1 {
                Duration::from_millis(500)
            } else {
                Duration::from_millis(1000)
            }
        })
        .collect()
}
