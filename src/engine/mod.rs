// * Engine: the plumbing around the extraction core
// * URL building, per-site throttling, browser sessions and the mining pool.

pub mod browser;
pub mod dispatcher;
pub mod rate_limiter;
pub mod urls;

pub use browser::{BrowserError, BrowserSession, ChromiumSession};
pub use dispatcher::{MiningPool, PoolReport};
pub use rate_limiter::{RateLimitManager, SiteRateLimiter};
pub use urls::{build_url, host_of, normalize_url};
