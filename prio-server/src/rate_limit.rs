//! Per-player vote submission rate limiting

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Checks between sweeps of idle player buckets
const PRUNE_INTERVAL: u64 = 1024;

/// Keyed limiter allowing a fixed number of submissions per player per minute
///
/// Only players already known to exist should be checked. Buckets whose
/// quota has fully replenished are swept every [`PRUNE_INTERVAL`] checks.
pub struct VoteRateLimiter<C: Clock = DefaultClock> {
    limiter: RateLimiter<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<C::Instant>>,
    checks: AtomicU64,
}

impl VoteRateLimiter {
    /// A zero quota is treated as one submission per minute
    pub fn per_minute(submissions: u32) -> Self {
        Self::with_clock(submissions, DefaultClock::default())
    }
}

impl<C: Clock> VoteRateLimiter<C> {
    pub fn with_clock(submissions: u32, clock: C) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(submissions).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::new(quota, DefaultKeyedStateStore::default(), clock),
            checks: AtomicU64::new(0),
        }
    }

    /// True if `player_id` may submit now; consumes one unit of its quota
    pub fn check(&self, player_id: &str) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == PRUNE_INTERVAL - 1 {
            self.prune();
        }

        let allowed = self.limiter.check_key(&player_id.to_string()).is_ok();
        if !allowed {
            warn!("Vote submission rate limit exceeded for player {}", player_id);
        }
        allowed
    }

    /// Drop buckets that are indistinguishable from a fresh one
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!("Pruned vote rate limiter: {} -> {} players", before, self.limiter.len());
    }

    /// Number of players currently holding a bucket
    pub fn tracked_players(&self) -> usize {
        self.limiter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::time::Duration;

    #[test]
    fn test_quota_enforced_per_player() {
        let limiter = VoteRateLimiter::per_minute(2);

        assert!(limiter.check("p1"));
        assert!(limiter.check("p1"));
        assert!(!limiter.check("p1"));

        // separate bucket per key
        assert!(limiter.check("p2"));
    }

    #[test]
    fn test_prune_drops_replenished_buckets() {
        let clock = FakeRelativeClock::default();
        let limiter = VoteRateLimiter::with_clock(1, clock.clone());

        assert!(limiter.check("p1"));
        assert!(limiter.check("p2"));
        assert_eq!(limiter.tracked_players(), 2);

        // still within the window: buckets carry state and survive
        limiter.prune();
        assert_eq!(limiter.tracked_players(), 2);
        assert!(!limiter.check("p1"));

        clock.advance(Duration::from_secs(61));
        limiter.prune();
        assert_eq!(limiter.tracked_players(), 0);
        assert!(limiter.check("p1"));
    }

    #[test]
    fn test_periodic_prune_bounds_tracked_players() {
        let clock = FakeRelativeClock::default();
        let limiter = VoteRateLimiter::with_clock(1, clock.clone());

        for i in 0..PRUNE_INTERVAL - 1 {
            limiter.check(&format!("p{}", i));
        }
        assert_eq!(limiter.tracked_players(), (PRUNE_INTERVAL - 1) as usize);

        clock.advance(Duration::from_secs(61));
        // this check triggers the sweep before inserting its own bucket
        assert!(limiter.check("late"));
        assert_eq!(limiter.tracked_players(), 1);
    }
}
