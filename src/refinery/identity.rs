// * Identifier resolution over season roster tables.
// * Exact name match, then exact team match; first qualifying row wins.

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::document::{attr, cell_text, has_class, StatDocument};
use super::errors::ExtractionError;
use crate::config::constants::{PLAYER_ID_SUFFIX, ROSTER_DIVIDER_CLASS};
use crate::ops::telemetry;

static SELECTOR_BODY_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("Invalid body row selector"));
static SELECTOR_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Invalid td selector"));
static SELECTOR_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("Invalid link selector"));

/// Batting or throwing hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
    Switch,
}

impl Hand {
    /// Reads the single-letter and long-form vocabularies the sites use
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Some(Hand::Left),
            "r" | "right" => Some(Hand::Right),
            "s" | "b" | "both" | "switch" => Some(Hand::Switch),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Hand::Left => "L",
            Hand::Right => "R",
            Hand::Switch => "S",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// A player as listed by one site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub name: String,
    pub id: String,
    pub team: String,
}

impl PlayerIdentity {
    pub fn new(name: &str, id: &str, team: &str) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            team: team.to_string(),
        }
    }
}

/// Where a roster cell lives inside a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellLocator {
    /// Position among the row's `td` cells
    Index(usize),
    /// The `td` whose `data-stat` attribute has this value
    DataStat(String),
}

impl CellLocator {
    pub fn data_stat(name: &str) -> Self {
        CellLocator::DataStat(name.to_string())
    }

    pub fn locate<'a>(&self, row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            CellLocator::Index(index) => row.select(&SELECTOR_TD).nth(*index),
            CellLocator::DataStat(name) => row
                .select(&SELECTOR_TD)
                .find(|td| td.value().attr("data-stat") == Some(name.as_str())),
        }
    }
}

/// Shape of a site's season roster table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterLayout {
    pub table_id: String,
    pub name_cell: CellLocator,
    pub team_cell: CellLocator,
    pub divider_class: String,
    pub id_suffix: String,
}

impl RosterLayout {
    pub fn new(table_id: &str, name_cell: CellLocator, team_cell: CellLocator) -> Self {
        Self {
            table_id: table_id.to_string(),
            name_cell,
            team_cell,
            divider_class: ROSTER_DIVIDER_CLASS.to_string(),
            id_suffix: PLAYER_ID_SUFFIX.to_string(),
        }
    }
}

/// Why a roster row produced no identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    Divider,
    MissingNameCell,
    MissingLink,
    MissingHref,
    MissingTeamCell,
}

/// Per-row result of a bulk roster scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Parsed(PlayerIdentity),
    Skipped { row: usize, reason: SkipReason },
}

impl RowOutcome {
    pub fn identity(&self) -> Option<&PlayerIdentity> {
        match self {
            RowOutcome::Parsed(identity) => Some(identity),
            RowOutcome::Skipped { .. } => None,
        }
    }
}

/// Last path segment of a profile link with the file suffix removed
pub fn derive_player_id(href: &str, suffix: &str) -> Option<String> {
    let segment = href.split('/').next_back()?;
    let id = segment.strip_suffix(suffix).unwrap_or(segment);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Resolves `full_name` on `team` to the site's player id
pub fn resolve_id(
    doc: &StatDocument,
    layout: &RosterLayout,
    full_name: &str,
    team: &str,
) -> Result<String, ExtractionError> {
    let not_found = || ExtractionError::PlayerNameNotFound(full_name.to_string());
    let table = doc.find_table(&layout.table_id).ok_or_else(not_found)?;

    for row in table.select(&SELECTOR_BODY_ROW) {
        if has_class(&row, &layout.divider_class) {
            continue;
        }

        let Some(link) = layout
            .name_cell
            .locate(&row)
            .and_then(|cell| cell.select(&SELECTOR_LINK).next())
        else {
            continue;
        };

        if cell_text(&link) != full_name {
            continue;
        }

        let Some(team_cell) = layout.team_cell.locate(&row) else {
            continue;
        };
        if cell_text(&team_cell) != team {
            continue;
        }

        if let Some(id) = attr(&link, "href").and_then(|href| derive_player_id(href, &layout.id_suffix)) {
            debug!(player = %full_name, team = %team, id = %id, "Player id resolved");
            return Ok(id);
        }
    }

    Err(not_found())
}

/// Parses every body row of the roster, one outcome per row.
///
/// A missing roster table yields an empty scan.
pub fn scan_roster(doc: &StatDocument, layout: &RosterLayout) -> Vec<RowOutcome> {
    let Some(table) = doc.find_table(&layout.table_id) else {
        debug!(table_id = %layout.table_id, "Roster table not found");
        return Vec::new();
    };

    let outcomes: Vec<RowOutcome> = table
        .select(&SELECTOR_BODY_ROW)
        .enumerate()
        .map(|(index, row)| match parse_roster_row(&row, layout) {
            Ok(identity) => RowOutcome::Parsed(identity),
            Err(reason) => {
                debug!(row = index, reason = ?reason, "Roster row skipped");
                RowOutcome::Skipped { row: index, reason }
            }
        })
        .collect();

    let skipped = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, RowOutcome::Skipped { .. }))
        .count();
    if skipped > 0 {
        info!(table_id = %layout.table_id, skipped, total = outcomes.len(), "Roster scan skipped rows");
        telemetry::record_roster_rows_skipped(skipped as u64);
    }

    outcomes
}

/// Every identity the roster yields, malformed rows left out
pub fn list_identities(doc: &StatDocument, layout: &RosterLayout) -> Vec<PlayerIdentity> {
    scan_roster(doc, layout)
        .into_iter()
        .filter_map(|outcome| match outcome {
            RowOutcome::Parsed(identity) => Some(identity),
            RowOutcome::Skipped { .. } => None,
        })
        .collect()
}

// * Team text keeps only the first listed team (the one the player started with)
pub(crate) fn parse_roster_row(
    row: &ElementRef<'_>,
    layout: &RosterLayout,
) -> Result<PlayerIdentity, SkipReason> {
    if has_class(row, &layout.divider_class) {
        return Err(SkipReason::Divider);
    }

    let name_cell = layout
        .name_cell
        .locate(row)
        .ok_or(SkipReason::MissingNameCell)?;
    let link = name_cell
        .select(&SELECTOR_LINK)
        .next()
        .ok_or(SkipReason::MissingLink)?;
    let id = attr(&link, "href")
        .and_then(|href| derive_player_id(href, &layout.id_suffix))
        .ok_or(SkipReason::MissingHref)?;
    let team_cell = layout
        .team_cell
        .locate(row)
        .ok_or(SkipReason::MissingTeamCell)?;

    let team_text = cell_text(&team_cell);
    let team = team_text.split(',').next().unwrap_or_default().trim();

    Ok(PlayerIdentity::new(&cell_text(&link), &id, team))
}
