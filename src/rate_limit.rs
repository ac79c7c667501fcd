use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const WINDOW_DURATION: Duration = Duration::from_secs(60);
pub const MAX_REQUESTS_PER_WINDOW: u32 = 10;
// longest window we accept, keeps `now + window` far from Instant overflow
pub const MAX_WINDOW_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// Rate limit entry - tracks requests per user identity
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

// outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Rejected { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

// Per-identity quota; where the counters live is up to the implementation
pub trait RateLimiter: Send + Sync {
    fn check(&self, identity: &str) -> RateLimitDecision;
    fn tracked_identities(&self) -> usize;
}

// time source, swapped for ManualClock in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Fixed-window counter keyed by identity. The window resets entirely once
// now > reset_at, so up to twice the quota can land across a boundary.
pub struct InMemoryRateLimiter<C: Clock = SystemClock> {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
    clock: C,
}

impl InMemoryRateLimiter<SystemClock> {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, SystemClock)
    }
}

impl Default for InMemoryRateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new(MAX_REQUESTS_PER_WINDOW, WINDOW_DURATION)
    }
}

impl<C: Clock> InMemoryRateLimiter<C> {
    pub fn with_clock(max_requests: u32, window: Duration, clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window: window.min(MAX_WINDOW_DURATION),
            clock,
        }
    }

    fn window_end(&self, now: Instant) -> Instant {
        // a clock pushed near the end of Instant's range saturates instead of panicking
        now.checked_add(self.window).unwrap_or(now)
    }

    pub fn entry_count(&self, identity: &str) -> Option<u32> {
        self.entries.get(identity).map(|entry| entry.count)
    }
}

impl<C: Clock> RateLimiter for InMemoryRateLimiter<C> {
    fn check(&self, identity: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let fresh = RateLimitEntry {
            count: 1,
            reset_at: self.window_end(now),
        };

        // the shard lock is held until `entry` drops, so check-then-increment is atomic per key
        let mut entry = match self.entries.entry(identity.to_string()) {
            Entry::Occupied(occupied) => occupied.into_ref(),
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                return RateLimitDecision::Allowed {
                    remaining: self.max_requests.saturating_sub(1),
                };
            }
        };

        // window expired..? start a new one
        if now > entry.reset_at {
            *entry = fresh;
            return RateLimitDecision::Allowed {
                remaining: self.max_requests.saturating_sub(1),
            };
        }

        if entry.count >= self.max_requests {
            return RateLimitDecision::Rejected {
                retry_after: entry.reset_at.saturating_duration_since(now),
            };
        }

        entry.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    fn tracked_identities(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(clock: &ManualClock) -> InMemoryRateLimiter<ManualClock> {
        InMemoryRateLimiter::with_clock(MAX_REQUESTS_PER_WINDOW, WINDOW_DURATION, clock.clone())
    }

    #[test]
    fn allows_quota_then_rejects() {
        let clock = ManualClock::new();
        let limiter = limiter(&clock);

        for i in 0..MAX_REQUESTS_PER_WINDOW {
            let decision = limiter.check("alice");
            assert_eq!(
                decision,
                RateLimitDecision::Allowed {
                    remaining: MAX_REQUESTS_PER_WINDOW - i - 1
                }
            );
        }

        let decision = limiter.check("alice");
        assert!(!decision.is_allowed());
        assert_eq!(limiter.entry_count("alice"), Some(MAX_REQUESTS_PER_WINDOW));
    }

    #[test]
    fn rejection_reports_time_until_reset() {
        let clock = ManualClock::new();
        let limiter = limiter(&clock);
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            limiter.check("alice");
        }
        clock.advance(Duration::from_secs(20));

        match limiter.check("alice") {
            RateLimitDecision::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn window_reset_restores_quota() {
        let clock = ManualClock::new();
        let limiter = limiter(&clock);
        for _ in 0..=MAX_REQUESTS_PER_WINDOW {
            limiter.check("alice");
        }
        assert!(!limiter.check("alice").is_allowed());

        clock.advance(WINDOW_DURATION + Duration::from_millis(1));

        assert!(limiter.check("alice").is_allowed());
        assert_eq!(limiter.entry_count("alice"), Some(1));
    }

    #[test]
    fn window_is_still_closed_exactly_at_reset_time() {
        let clock = ManualClock::new();
        let limiter = limiter(&clock);
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            limiter.check("alice");
        }

        clock.advance(WINDOW_DURATION);
        assert!(!limiter.check("alice").is_allowed());
    }

    #[test]
    fn identities_do_not_share_quota() {
        let clock = ManualClock::new();
        let limiter = limiter(&clock);
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            limiter.check("alice");
        }
        assert!(!limiter.check("alice").is_allowed());

        assert!(limiter.check("bob").is_allowed());
        assert_eq!(limiter.entry_count("bob"), Some(1));
        assert_eq!(limiter.tracked_identities(), 2);
    }

    #[test]
    fn huge_window_is_capped_and_does_not_panic() {
        let clock = ManualClock::new();
        let limiter = InMemoryRateLimiter::with_clock(2, Duration::MAX, clock.clone());
        assert!(limiter.check("alice").is_allowed());
        assert!(limiter.check("alice").is_allowed());

        match limiter.check("alice") {
            RateLimitDecision::Rejected { retry_after } => {
                assert_eq!(retry_after, MAX_WINDOW_DURATION);
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        clock.advance(MAX_WINDOW_DURATION + Duration::from_secs(1));
        assert!(limiter.check("alice").is_allowed());
    }

    #[test]
    fn rejected_calls_do_not_increment() {
        let clock = ManualClock::new();
        let limiter = InMemoryRateLimiter::with_clock(2, WINDOW_DURATION, clock.clone());
        limiter.check("alice");
        limiter.check("alice");
        limiter.check("alice");
        limiter.check("alice");
        assert_eq!(limiter.entry_count("alice"), Some(2));
    }

    #[test]
    fn burst_across_boundary_is_allowed() {
        let clock = ManualClock::new();
        let limiter = limiter(&clock);
        clock.advance(WINDOW_DURATION - Duration::from_secs(1));
        // first request opens the window here
        let mut allowed = 0;
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            if limiter.check("alice").is_allowed() {
                allowed += 1;
            }
        }
        clock.advance(WINDOW_DURATION + Duration::from_millis(1));
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            if limiter.check("alice").is_allowed() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 2 * MAX_REQUESTS_PER_WINDOW);
    }
}
