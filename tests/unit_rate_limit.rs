// Unit tests for the per-client sliding-window rate limiter.
//
// Time is injected through check_at, so these never sleep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use scamcheck::rate_limit::{Admission, ClientRateLimiter};

const WINDOW: Duration = Duration::from_secs(60);

#[test]
fn first_five_admitted_sixth_rejected() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();

    for i in 0..5 {
        let at = t0 + Duration::from_secs(i);
        assert!(
            limiter.check_at("203.0.113.7", at).is_admitted(),
            "request {} should be admitted",
            i + 1
        );
    }

    let sixth = limiter.check_at("203.0.113.7", t0 + Duration::from_secs(10));
    assert!(matches!(sixth, Admission::Rejected { .. }));
}

#[test]
fn remaining_counts_down() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();
    let remaining: Vec<usize> = (0..5)
        .map(|_| match limiter.check_at("c", t0) {
            Admission::Admitted { remaining } => remaining,
            Admission::Rejected { .. } => panic!("should be admitted"),
        })
        .collect();
    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);
}

#[test]
fn admitted_again_once_oldest_leaves_window() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();
    for i in 0..5 {
        limiter.check_at("c", t0 + Duration::from_secs(i));
    }
    assert!(!limiter.check_at("c", t0 + Duration::from_secs(30)).is_admitted());

    // Exactly one window after the oldest entry, that entry no longer counts
    assert!(limiter.check_at("c", t0 + WINDOW).is_admitted());

    // The second-oldest is still inside the window, so the next one is refused
    assert!(!limiter.check_at("c", t0 + WINDOW).is_admitted());
}

#[test]
fn rejected_requests_are_not_recorded() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();
    for _ in 0..5 {
        limiter.check_at("c", t0);
    }
    // Hammering during the window must not push the reopening time back
    for s in 1..59 {
        assert!(!limiter.check_at("c", t0 + Duration::from_secs(s)).is_admitted());
    }
    assert!(limiter.check_at("c", t0 + WINDOW).is_admitted());
}

#[test]
fn retry_after_points_at_oldest_expiry() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();
    for i in 0..5 {
        limiter.check_at("c", t0 + Duration::from_secs(i));
    }
    assert_eq!(
        limiter.check_at("c", t0 + Duration::from_secs(20)),
        Admission::Rejected {
            retry_after: Duration::from_secs(40)
        }
    );
}

#[test]
fn clients_are_limited_independently() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();
    for _ in 0..5 {
        limiter.check_at("a", t0);
    }
    assert!(!limiter.check_at("a", t0).is_admitted());
    assert!(limiter.check_at("b", t0).is_admitted());
}

#[test]
fn custom_limit_and_window() {
    let limiter = ClientRateLimiter::new(2, Duration::from_secs(1));
    let t0 = Instant::now();
    assert!(limiter.check_at("c", t0).is_admitted());
    assert!(limiter.check_at("c", t0).is_admitted());
    assert!(!limiter.check_at("c", t0 + Duration::from_millis(999)).is_admitted());
    assert!(limiter.check_at("c", t0 + Duration::from_secs(1)).is_admitted());
}

#[test]
fn eviction_forgets_idle_clients() {
    let limiter = ClientRateLimiter::default();
    let t0 = Instant::now();
    for client in ["a", "b", "c"] {
        limiter.check_at(client, t0);
    }
    limiter.check_at("d", t0 + Duration::from_secs(50));
    assert_eq!(limiter.tracked_clients(), 4);

    assert_eq!(limiter.evict_idle_at(t0 + Duration::from_secs(30)), 0);
    assert_eq!(limiter.evict_idle_at(t0 + WINDOW), 3);
    assert_eq!(limiter.tracked_clients(), 1);

    // An evicted client starts over with a full allowance
    assert_eq!(
        limiter.check_at("a", t0 + WINDOW),
        Admission::Admitted { remaining: 4 }
    );
}

#[test]
fn concurrent_requests_never_exceed_limit() {
    let limiter = Arc::new(ClientRateLimiter::default());
    let t0 = Instant::now();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || limiter.check_at("shared", t0).is_admitted())
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&ok| ok)
        .count();
    assert_eq!(admitted, 5);
}
