// * Browser capability for login-gated and script-rendered pages
// * Adapters depend on the BrowserSession trait; ChromiumSession drives a real browser.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::constants::ELEMENT_POLL_INTERVAL_MS;
use crate::config::MinerConfig;
use crate::refinery::StatDocument;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Page navigation failed: {0}")]
    Navigation(String),

    #[error("Page timeout after {0}ms")]
    Timeout(u64),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element interaction failed: {0}")]
    Interaction(String),
}

/// What an adapter may ask of a browser
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Waits until `selector` matches, or fails with `Timeout`
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError>;

    /// Current page markup
    async fn content(&self) -> Result<String, BrowserError>;

    /// Current page parsed for extraction
    async fn document(&self) -> Result<StatDocument, BrowserError> {
        let markup = self.content().await?;
        Ok(StatDocument::parse(&markup))
    }
}

// * ChromiumSession owns one browser with a single working tab
pub struct ChromiumSession {
    browser: Browser,
    handler: tokio::task::JoinHandle<()>,
    page: Page,
    page_timeout: Duration,
}

impl ChromiumSession {
    // * Launches a headless browser and opens a blank tab
    pub async fn launch(config: &MinerConfig) -> Result<Self, BrowserError> {
        let browser_config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", config.user_agent))
            .build()
            .map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // * Spawn handler in background
        let handle = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // * Drive the CDP connection
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        info!("Browser session launched");

        Ok(Self {
            browser,
            handler: handle,
            page,
            page_timeout: config.page_timeout(),
        })
    }

    // * Closes the browser gracefully
    pub async fn shutdown(mut self) {
        let _ = self.browser.close().await;
        self.handler.abort();
        info!("Browser session shutdown complete");
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // * Best effort cleanup - can't await in drop
        self.handler.abort();
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let timeout_ms = self.page_timeout.as_millis() as u64;
        match tokio::time::timeout(self.page_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                debug!(url = %url, "Navigated");
                Ok(())
            }
            Ok(Err(e)) => Err(BrowserError::Navigation(e.to_string())),
            Err(_) => Err(BrowserError::Timeout(timeout_ms)),
        }
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(timeout.as_millis() as u64));
            }
            tokio::time::sleep(Duration::from_millis(ELEMENT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))
    }
}
