//! Polls a wrapped search until it finds something, times out, or is cancelled.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ScoutResult;
use crate::searchlets::searchlet::Searchlet;

/// Shortest pause allowed between two attempts.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

pub struct BlockingSearch {
    inner: Box<dyn Searchlet>,
    interval: Duration,
    timeout: Option<Duration>,
}

impl BlockingSearch {
    /// `timeout` of `None` keeps polling until a result or cancellation.
    #[must_use]
    pub fn new(inner: Box<dyn Searchlet>, interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            inner,
            interval,
            timeout,
        }
    }

    /// Configured interval raised to [`MIN_INTERVAL`].
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_INTERVAL)
    }
}

#[async_trait]
impl Searchlet for BlockingSearch {
    fn name(&self) -> &'static str {
        "blocking"
    }

    fn summary(&self) -> String {
        let timeout: String = self
            .timeout
            .map_or_else(|| "none".to_string(), |t: Duration| format!("{t:?}"));

        format!(
            "poll every {:?} (timeout: {timeout}): {}",
            self.effective_interval(),
            self.inner.summary()
        )
    }

    fn check(&self) -> ScoutResult<()> {
        self.inner.check()
    }

    async fn do_search(&self, cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
        let started: Instant = Instant::now();
        let interval: Duration = self.effective_interval();
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            let result: Vec<String> = self.inner.search(cancel).await?;

            if !result.is_empty() {
                debug!(attempts, found = result.len(), "Blocking search satisfied");
                return Ok(result);
            }

            if cancel.is_cancelled() {
                return Ok(result);
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    info!(
                        marker = "BLOCKING_SEARCH_TIMEOUT",
                        attempts,
                        "Gave up waiting after {:?}",
                        started.elapsed()
                    );
                    return Ok(Vec::new());
                }
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(attempts, "Blocking search cancelled while waiting");
                    return Ok(result);
                }

                () = time::sleep(interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Empty for the first `empty_rounds` calls, then `[hit]`.
    struct Eventually {
        calls: Arc<AtomicUsize>,
        empty_rounds: usize,
    }

    #[async_trait]
    impl Searchlet for Eventually {
        fn name(&self) -> &'static str {
            "eventually"
        }

        fn summary(&self) -> String {
            "eventually".to_string()
        }

        async fn do_search(&self, _cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
            let call: usize = self.calls.fetch_add(1, Ordering::SeqCst);

            if call < self.empty_rounds {
                Ok(Vec::new())
            } else {
                Ok(vec!["hit".to_string()])
            }
        }
    }

    struct Broken;

    #[async_trait]
    impl Searchlet for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn summary(&self) -> String {
            "broken".to_string()
        }

        fn check(&self) -> ScoutResult<()> {
            Err(ScoutError::invalid_config("broken", "always fails"))
        }

        async fn do_search(&self, _cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn eventually(empty_rounds: usize) -> (Box<dyn Searchlet>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Eventually {
            calls: Arc::clone(&calls),
            empty_rounds,
        };

        (Box::new(inner), calls)
    }

    #[tokio::test]
    async fn retries_until_inner_finds_something() {
        let (inner, calls) = eventually(3);
        let search = BlockingSearch::new(inner, Duration::from_millis(1), None);

        let found = search.search(&CancellationToken::new()).await.unwrap();

        assert_eq!(found, ["hit"]);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        let (inner, calls) = eventually(usize::MAX);
        let search = BlockingSearch::new(
            inner,
            Duration::from_millis(10),
            Some(Duration::from_millis(50)),
        );

        let found = search.search(&CancellationToken::new()).await.unwrap();

        assert!(found.is_empty());
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let (inner, _calls) = eventually(usize::MAX);
        let search = BlockingSearch::new(inner, Duration::from_secs(3600), None);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let found = time::timeout(Duration::from_secs(5), search.search(&cancel))
            .await
            .expect("cancellation should end the wait")
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn inner_check_failure_propagates() {
        let search = BlockingSearch::new(Box::new(Broken), Duration::from_millis(1), None);

        assert!(matches!(
            search.search(&CancellationToken::new()).await,
            Err(ScoutError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn interval_has_a_floor() {
        let (inner, _calls) = eventually(0);
        let search = BlockingSearch::new(inner, Duration::ZERO, None);

        assert_eq!(search.effective_interval(), MIN_INTERVAL);
    }
}
