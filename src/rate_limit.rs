// Per-client sliding-window rate limiting for the analyze endpoint.
//
// Each client identifier maps to a queue of the instants at which its
// requests were admitted. On every check the queue is pruned of entries
// that have left the window; if what remains is already at the limit the
// request is rejected and nothing is recorded.
//
// The whole prune-check-record step runs under a single Mutex, so two
// concurrent requests from the same client can never both slip past the
// limit. The lock is never held across an await point.
//
// Clients that stop sending requests would otherwise keep an (empty) queue
// forever; `evict_idle_at` drops them and the server calls it periodically.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Default number of requests admitted per client per window.
pub const DEFAULT_MAX_REQUESTS: usize = 5;

/// Default sliding-window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request was recorded. `remaining` is how many more the client may
    /// send before the oldest entry leaves the window.
    Admitted { remaining: usize },
    /// The request was refused and not recorded.
    Rejected { retry_after: Duration },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// A sliding-window rate limiter keyed by client identifier.
///
/// Thread-safe via interior mutability so it can be shared across request
/// handlers with `Arc<ClientRateLimiter>`.
pub struct ClientRateLimiter {
    /// Admission timestamps per client, oldest first.
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    /// Maximum number of requests admitted per window.
    max_requests: usize,
    /// Duration of the sliding window.
    window: Duration,
}

impl Default for ClientRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl ClientRateLimiter {
    /// Create a limiter admitting `max_requests` per client in any `window`.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record a request from `client` at the current instant.
    pub fn check(&self, client: &str) -> Admission {
        self.check_at(client, Instant::now())
    }

    /// Check and record a request from `client` at `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> Admission {
        let mut windows = self.lock();
        let timestamps = windows.entry(client.to_string()).or_default();
        prune(timestamps, now, self.window);

        if timestamps.len() >= self.max_requests {
            // Window is full — the client may retry once the oldest entry expires
            let retry_after = timestamps
                .front()
                .and_then(|&oldest| oldest.checked_add(self.window))
                .map(|reopens| reopens.saturating_duration_since(now))
                .unwrap_or(self.window);
            warn!(
                client,
                in_window = timestamps.len(),
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            return Admission::Rejected { retry_after };
        }

        timestamps.push_back(now);
        Admission::Admitted {
            remaining: self.max_requests - timestamps.len(),
        }
    }

    /// Drop clients with no requests left in the window as of `now`.
    ///
    /// Returns the number of clients removed.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            !timestamps.is_empty()
        });
        let evicted = before - windows.len();
        if evicted > 0 {
            debug!(evicted, remaining = windows.len(), "Evicted idle rate-limit clients");
        }
        evicted
    }

    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Number of client identifiers currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave a queue half-updated in a
    // way that matters here, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Remove timestamps that have fallen outside the window ending at `now`.
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = timestamps.front() {
        if now.saturating_duration_since(oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

/// Spawn a background task that evicts idle clients once per window.
pub fn spawn_eviction_task(limiter: Arc<ClientRateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        // The first tick completes immediately; skip it
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.evict_idle();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit_then_rejects() {
        let limiter = ClientRateLimiter::new(2, Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(
            limiter.check_at("a", t0),
            Admission::Admitted { remaining: 1 }
        );
        assert_eq!(
            limiter.check_at("a", t0),
            Admission::Admitted { remaining: 0 }
        );
        assert!(!limiter.check_at("a", t0).is_admitted());
    }

    #[test]
    fn test_retry_after_counts_down_from_oldest() {
        let limiter = ClientRateLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();
        limiter.check_at("a", t0);
        let result = limiter.check_at("a", t0 + Duration::from_secs(4));
        assert_eq!(
            result,
            Admission::Rejected {
                retry_after: Duration::from_secs(6)
            }
        );
    }

    #[test]
    fn test_huge_window_does_not_overflow_instant() {
        let limiter = ClientRateLimiter::new(1, Duration::from_secs(u64::MAX / 2));
        let t0 = Instant::now();
        assert!(limiter.check_at("a", t0).is_admitted());
        assert_eq!(
            limiter.check_at("a", t0),
            Admission::Rejected {
                retry_after: Duration::from_secs(u64::MAX / 2)
            }
        );
        assert_eq!(limiter.evict_idle_at(t0 + Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_evict_idle_drops_only_expired_clients() {
        let limiter = ClientRateLimiter::new(5, Duration::from_secs(10));
        let t0 = Instant::now();
        limiter.check_at("old", t0);
        limiter.check_at("fresh", t0 + Duration::from_secs(8));
        assert_eq!(limiter.tracked_clients(), 2);

        let evicted = limiter.evict_idle_at(t0 + Duration::from_secs(12));
        assert_eq!(evicted, 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
