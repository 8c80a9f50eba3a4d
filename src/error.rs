use thiserror::Error;

use crate::engine::browser::BrowserError;
use crate::network::errors::NetworkError;
use crate::refinery::errors::ExtractionError;

// * Crate-level error: anything a mining call can fail with.
#[derive(Error, Debug)]
pub enum MinerError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("Failed to parse {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, MinerError>;
