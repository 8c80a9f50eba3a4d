use thiserror::Error;

// * Unified Error type for the Network Layer.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Soft Ban detected: {0}")]
    SoftBan(String),

    #[error("HTTP {0} Forbidden/Blocked")]
    HardBan(u16),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Exhausted {attempts} attempts fetching {url}")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
