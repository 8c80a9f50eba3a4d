// * Stat-Miner: baseball statistics extraction.
// * The refinery turns parsed pages into records, identities and plate
// * appearances; site adapters, the network client and the engine feed it.

pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod ops;
pub mod refinery;
pub mod sites;

pub use config::{MinerConfig, TeamDictionary};
pub use error::{MinerError, Result};
pub use refinery::{
    extract_summary_row, extract_table, interpret, resolve_id, select_row, ExtractionError,
    PlateAppearanceOutcome, StatDocument, StatRecord,
};
