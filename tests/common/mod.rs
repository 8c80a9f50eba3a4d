// * Shared fixtures for the site adapter tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use stat_miner::engine::{BrowserError, BrowserSession};

/// Serves fixed markup and records every interaction.
/// Selectors listed in `missing` time out when waited on.
#[derive(Default)]
pub struct ScriptedSession {
    pub markup: String,
    pub missing: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedSession {
    pub fn serving(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            ..Default::default()
        }
    }

    pub fn without(mut self, selector: &'static str) -> Self {
        self.missing.push(selector);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.record(format!("navigate {url}"));
        Ok(())
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.record(format!("wait {selector}"));
        if self.missing.iter().any(|missing| *missing == selector) {
            return Err(BrowserError::Timeout(timeout.as_millis() as u64));
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        self.record(format!("click {selector}"));
        Ok(())
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        self.record(format!("type {selector} {text}"));
        Ok(())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.markup.clone())
    }
}
