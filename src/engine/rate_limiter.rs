// * Per-site rate limiting
// * Stat sites throttle aggressively (Baseball-Reference bans bursts), so every
// * request to a host waits on that host's governor bucket.

use governor::{Quota, RateLimiter as GovernorLimiter};
use nonzero_ext::nonzero;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

// * SiteRateLimiter manages rate limiting for a single host
pub struct SiteRateLimiter {
    host: String,
    requests_per_second: u32,
    local_limiter: GovernorLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl SiteRateLimiter {
    pub fn new(host: &str, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32)));
        let local_limiter = GovernorLimiter::direct(quota);

        Self {
            host: host.to_string(),
            requests_per_second: requests_per_second.max(1),
            local_limiter,
        }
    }

    // * Checks the bucket without waiting
    pub fn check(&self) -> bool {
        self.local_limiter.check().is_ok()
    }

    // * Waits until the bucket allows a request
    pub async fn wait(&self) {
        self.local_limiter.until_ready().await;
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }
}

// * RateLimitManager hands out one limiter per host
pub struct RateLimitManager {
    default_rps: u32,
    limiters: Arc<RwLock<HashMap<String, Arc<SiteRateLimiter>>>>,
}

impl RateLimitManager {
    pub fn new(default_rps: u32) -> Self {
        Self {
            default_rps,
            limiters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // * Registers a host with its own quota, replacing any earlier one
    pub async fn register_site(&self, host: &str, requests_per_second: u32) -> Arc<SiteRateLimiter> {
        let limiter = Arc::new(SiteRateLimiter::new(host, requests_per_second));

        let mut limiters = self.limiters.write().await;
        limiters.insert(host.to_string(), Arc::clone(&limiter));

        debug!(host = %host, rps = limiter.requests_per_second(), "Registered site limiter");

        limiter
    }

    // * Gets or creates the limiter for a host
    pub async fn get_limiter(&self, host: &str) -> Arc<SiteRateLimiter> {
        let limiters = self.limiters.read().await;
        if let Some(limiter) = limiters.get(host) {
            return Arc::clone(limiter);
        }
        drop(limiters);

        self.register_site(host, self.default_rps).await
    }

    // * Waits for permission to send one request to `host`
    pub async fn acquire(&self, host: &str) {
        let limiter = self.get_limiter(host).await;
        limiter.wait().await;
    }
}
