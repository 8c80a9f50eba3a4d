// * The Refinery: stat extraction over parsed documents.
// * Pure, synchronous functions over a read-only StatDocument. Site adapters
// * feed documents in and get typed records, identities and play outcomes out.

pub mod document;
pub mod errors;
pub mod identity;
pub mod play_interpreter;
pub mod summary;
pub mod tables;

// * Re-exports for convenient access
pub use document::StatDocument;
pub use errors::ExtractionError;
pub use identity::{
    derive_player_id, list_identities, resolve_id, scan_roster, CellLocator, Hand, PlayerIdentity,
    RosterLayout, RowOutcome, SkipReason,
};
pub use play_interpreter::{
    interpret, parse_pitch_count, parse_play_date, parse_runners, BaseState, PitchCount,
    PlateAppearanceOutcome, PlayContext, PlayEvent, StatLine, STAT_LINE_KEYS,
};
pub use summary::{extract_summary_row, SummaryMarker};
pub use tables::{
    extract_table, extract_table_with, select_body_row, select_row, CellValue, ExtractedTable,
    RowLayout, StatRecord,
};
