//! Outbound request throttling
//!
//! The `rate_limit_rps` setting caps how fast a collector hits the remote
//! API. Login, discovery and every collect page draw from the same bucket.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type DirectLimiter = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Request budget for one collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling kicks in
    pub burst_size: u32,
}

impl RateLimiterConfig {
    /// Explicit rate and burst
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Burst equal to one second of traffic
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, requests_per_second)
    }

    fn quota(&self) -> Quota {
        // zero would make governor reject the quota; clamp to one
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket; clones draw from the same budget
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DirectLimiter>,
    requests_per_second: u32,
}

impl RateLimiter {
    /// Build a limiter from its budget
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Governor::direct(config.quota())),
            requests_per_second: config.requests_per_second.max(1),
        }
    }

    /// Suspend until the next request fits in the budget
    pub async fn wait(&self) {
        if self.bucket.check().is_ok() {
            return;
        }
        debug!(rps = self.requests_per_second, "Request budget exhausted, waiting");
        self.bucket.until_ready().await;
    }

    /// Take a slot without waiting; `false` when throttled
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .finish_non_exhaustive()
    }
}
