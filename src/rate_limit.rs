//! Rate-limit bookkeeping invoked whenever the upstream answers 429.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::warn;

/// Side-effect hook called once per observed 429 response.
#[cfg_attr(test, mockall::automock)]
pub trait RateLimitHandler: Send + Sync {
    /// `retry_after` is the upstream's `Retry-After` hint, when it sent one.
    /// It is informational only; backoff delays come from the `RetryPolicy`.
    fn on_rate_limit(&self, provider_name: &str, retry_after: Option<Duration>);
}

/// Process-wide informational counters for rate-limit events.
///
/// Only atomics are touched, so a single tracker can be shared by any number of
/// providers and concurrent requests.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    hits: AtomicU64,
    last_hit_unix_ms: AtomicU64,
    last_retry_after_ms: AtomicU64,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of 429 responses observed.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Wall-clock time of the most recent 429, if any was observed.
    pub fn last_hit(&self) -> Option<SystemTime> {
        match self.last_hit_unix_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(UNIX_EPOCH + Duration::from_millis(ms)),
        }
    }

    /// Most recent `Retry-After` hint.
    pub fn last_retry_after(&self) -> Option<Duration> {
        match self.last_retry_after_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl RateLimitHandler for RateLimitTracker {
    fn on_rate_limit(&self, provider_name: &str, retry_after: Option<Duration>) {
        let hits = self.hits.fetch_add(1, Ordering::Relaxed) + 1;

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.last_hit_unix_ms.fetch_max(now_ms, Ordering::Relaxed);

        if let Some(hint) = retry_after {
            self.last_retry_after_ms
                .store(hint.as_millis() as u64, Ordering::Relaxed);
        }

        match retry_after {
            Some(hint) => warn!(
                "{}: rate limit exceeded (#{}), upstream asks to retry after {}s",
                provider_name,
                hits,
                hint.as_secs()
            ),
            None => warn!("{}: rate limit exceeded (#{})", provider_name, hits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tracker_starts_empty() {
        let tracker = RateLimitTracker::new();
        assert_eq!(tracker.hits(), 0);
        assert!(tracker.last_hit().is_none());
        assert!(tracker.last_retry_after().is_none());
    }

    #[test]
    fn test_tracker_counts_hits() {
        let tracker = RateLimitTracker::new();
        tracker.on_rate_limit("exa_similar", None);
        tracker.on_rate_limit("exa_contents", Some(Duration::from_secs(7)));

        assert_eq!(tracker.hits(), 2);
        assert!(tracker.last_hit().is_some());
        assert_eq!(tracker.last_retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_tracker_is_shareable_across_threads() {
        let tracker = Arc::new(RateLimitTracker::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.on_rate_limit("exa_contents", None);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.hits(), 400);
    }
}
