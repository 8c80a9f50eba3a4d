// * Runtime configuration
// * Compile-time defaults live in `constants`; `MinerConfig::from_env` overlays STAT_MINER_* variables.

pub mod constants;
pub mod teams;

pub use teams::TeamDictionary;

use std::time::Duration;
use tracing::warn;

use constants::{
    DEFAULT_REQUESTS_PER_SECOND, DEFAULT_USER_AGENT, DEFAULT_WORKER_COUNT, FETCH_ATTEMPTS,
    PAGE_TIMEOUT_MS, REQUEST_TIMEOUT_MS, RETRY_BACKOFF_MS,
};

const ENV_USER_AGENT: &str = "STAT_MINER_USER_AGENT";
const ENV_FETCH_ATTEMPTS: &str = "STAT_MINER_FETCH_ATTEMPTS";
const ENV_REQUEST_TIMEOUT_MS: &str = "STAT_MINER_REQUEST_TIMEOUT_MS";
const ENV_REQUESTS_PER_SECOND: &str = "STAT_MINER_REQUESTS_PER_SECOND";
const ENV_WORKERS: &str = "STAT_MINER_WORKERS";
const ENV_PAGE_TIMEOUT_MS: &str = "STAT_MINER_PAGE_TIMEOUT_MS";

/// Settings shared by the network client, rate limiter, browser and worker pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    pub user_agent: String,
    /// Attempts per fetch before giving up on transport errors
    pub fetch_attempts: u32,
    pub request_timeout_ms: u64,
    pub retry_backoff_ms: u64,
    /// Requests per second allowed against a single site
    pub requests_per_second: u32,
    pub worker_count: usize,
    pub page_timeout_ms: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_attempts: FETCH_ATTEMPTS,
            request_timeout_ms: REQUEST_TIMEOUT_MS,
            retry_backoff_ms: RETRY_BACKOFF_MS,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            worker_count: DEFAULT_WORKER_COUNT,
            page_timeout_ms: PAGE_TIMEOUT_MS,
        }
    }
}

impl MinerConfig {
    /// Defaults overlaid with any STAT_MINER_* environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`; unparsable values are ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent;
        }
        overlay(&lookup, ENV_FETCH_ATTEMPTS, &mut config.fetch_attempts);
        overlay(&lookup, ENV_REQUEST_TIMEOUT_MS, &mut config.request_timeout_ms);
        overlay(&lookup, ENV_REQUESTS_PER_SECOND, &mut config.requests_per_second);
        overlay(&lookup, ENV_WORKERS, &mut config.worker_count);
        overlay(&lookup, ENV_PAGE_TIMEOUT_MS, &mut config.page_timeout_ms);

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

fn overlay<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!(key = key, value = %raw, "Ignoring unparsable config value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MinerConfig::default();
        assert_eq!(config.fetch_attempts, FETCH_ATTEMPTS);
        assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);
        assert_eq!(config.page_timeout(), Duration::from_millis(PAGE_TIMEOUT_MS));
    }

    #[test]
    fn test_lookup_overlay() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STAT_MINER_WORKERS", "3"),
            ("STAT_MINER_FETCH_ATTEMPTS", "not-a-number"),
            ("STAT_MINER_USER_AGENT", "stat-miner-test"),
        ]);
        let config = MinerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.worker_count, 3);
        assert_eq!(config.fetch_attempts, FETCH_ATTEMPTS);
        assert_eq!(config.user_agent, "stat-miner-test");
    }
}
