use crate::config::MinerConfig;
use crate::engine::rate_limiter::RateLimitManager;
use crate::network::errors::NetworkError;
use crate::ops::telemetry;
use crate::refinery::StatDocument;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// * The HTTP engine for pages that render without a browser.
pub struct FastClient {
    inner: Client,
    ban_title_regex: Regex,
    attempts: u32,
    backoff: Duration,
    limits: Option<Arc<RateLimitManager>>,
}

impl FastClient {
    // * Initializes the client from the runtime configuration.
    pub fn new(config: &MinerConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;

        let ban_regex = Regex::new(r"(?i)<title>[^<]*(Just a moment|Attention Required|Access Denied)")
            .expect("! CRITICAL: Failed to compile Soft Ban Regex");

        Ok(Self {
            inner: client,
            ban_title_regex: ban_regex,
            attempts: config.fetch_attempts.max(1),
            backoff: config.retry_backoff(),
            limits: None,
        })
    }

    // * Every request first waits on the per-site limiter.
    pub fn with_rate_limits(mut self, limits: Arc<RateLimitManager>) -> Self {
        self.limits = Some(limits);
        self
    }

    // * Fetches a URL. A 404 is Ok(None): the page simply does not exist.
    // * Transport failures and 5xx responses are retried; bans and other 4xx are not.
    pub async fn fetch(&self, url: &str) -> Result<Option<String>, NetworkError> {
        let parsed = Url::parse(url).map_err(|_| NetworkError::InvalidUrl(url.to_string()))?;
        let host = parsed.host_str().unwrap_or_default().to_string();

        for attempt in 1..=self.attempts {
            if let Some(limits) = &self.limits {
                limits.acquire(&host).await;
            }

            match self.fetch_once(parsed.as_str()).await {
                Ok(Some(body)) => {
                    telemetry::record_document_fetched("ok");
                    return Ok(Some(body));
                }
                Ok(None) => {
                    debug!(url = %url, "Page not found");
                    telemetry::record_document_fetched("not_found");
                    return Ok(None);
                }
                Err(e @ (NetworkError::HardBan(_) | NetworkError::SoftBan(_))) => {
                    telemetry::record_document_fetched("banned");
                    return Err(e);
                }
                // * Other 4xx answers will not change on retry
                Err(NetworkError::Request(e)) if e.status().is_some_and(|s| s.is_client_error()) => {
                    telemetry::record_document_fetched("rejected");
                    return Err(NetworkError::Request(e));
                }
                Err(e) => {
                    warn!(url = %url, attempt = attempt, error = %e, "Fetch failed");
                    if attempt < self.attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }

        telemetry::record_document_fetched("exhausted");
        Err(NetworkError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.attempts,
        })
    }

    // * Fetches and parses the visible document
    pub async fn fetch_document(&self, url: &str) -> Result<Option<StatDocument>, NetworkError> {
        Ok(self.fetch(url).await?.map(|body| StatDocument::parse(&body)))
    }

    // * Fetches and parses only the markup hidden inside comments
    pub async fn fetch_comment_document(&self, url: &str) -> Result<Option<StatDocument>, NetworkError> {
        Ok(self.fetch(url).await?.map(|body| StatDocument::from_comments(&body)))
    }

    async fn fetch_once(&self, url: &str) -> Result<Option<String>, NetworkError> {
        let resp = self.inner.get(url).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NetworkError::HardBan(status.as_u16()));
        }

        let resp = resp.error_for_status()?;
        let body = resp.text().await?;

        self.detect_soft_ban(&body)?;

        Ok(Some(body))
    }

    fn detect_soft_ban(&self, body: &str) -> Result<(), NetworkError> {
        if let Some(cap) = self.ban_title_regex.captures(body) {
            let trigger = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            return Err(NetworkError::SoftBan(format!("Title Trigger: {}", trigger)));
        }

        let signatures = ["cf-turnstile", "challenge-platform"];
        for sig in signatures {
            if body.contains(sig) {
                return Err(NetworkError::SoftBan(format!("Body Trigger: {}", sig)));
            }
        }

        Ok(())
    }
}
