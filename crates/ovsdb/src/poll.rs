use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};

/// Why [`poll_until`] gave up.
#[derive(Debug, Eq, PartialEq)]
pub enum PollError<E> {
    /// The condition did not hold before the timeout.
    Timeout(Duration),

    /// The probe failed.
    Failed(E),
}

/// Calls `probe` every `interval` until it returns `Ok(true)`.
///
/// The whole wait is bounded by `limit`: a probe still in flight when the
/// deadline passes is dropped.
///
/// # Errors
///
/// Returns `PollError::Timeout` once `limit` has elapsed and
/// `PollError::Failed` as soon as the probe fails.
pub async fn poll_until<F, Fut, E>(
    interval: Duration,
    limit: Duration,
    mut probe: F,
) -> Result<(), PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let polling = async {
        loop {
            match probe().await {
                Ok(true) => return Ok(()),
                Ok(false) => sleep(interval).await,
                Err(e) => return Err(PollError::Failed(e)),
            }
        }
    };

    timeout(limit, polling)
        .await
        .unwrap_or(Err(PollError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_returns_once_condition_holds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let result: Result<(), PollError<()>> = poll_until(
            Duration::from_millis(100),
            Duration::from_secs(2),
            || {
                let calls = calls.clone();
                async move { Ok(calls.fetch_add(1, Ordering::SeqCst) == 3) }
            },
        )
        .await;

        assert_eq!(result, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let start = Instant::now();

        let result: Result<(), PollError<()>> = poll_until(
            Duration::from_millis(300),
            Duration::from_secs(1),
            || async { Ok(false) },
        )
        .await;

        assert_eq!(result, Err(PollError::Timeout(Duration::from_secs(1))));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_stops_polling() {
        let start = Instant::now();

        let result = poll_until(Duration::from_millis(100), Duration::from_secs(2), || async {
            Err::<bool, _>("socket closed")
        })
        .await;

        assert_eq!(result, Err(PollError::Failed("socket closed")));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_is_cut_off() {
        let start = Instant::now();

        let result: Result<(), PollError<()>> = poll_until(
            Duration::from_millis(10),
            Duration::from_secs(1),
            || async {
                sleep(Duration::from_secs(5)).await;
                Ok(true)
            },
        )
        .await;

        assert_eq!(result, Err(PollError::Timeout(Duration::from_secs(1))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
