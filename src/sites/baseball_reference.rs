// * Baseball-Reference adapter.
// * Split pages, game logs and season rosters hide most tables inside HTML
// * comments, so every page is parsed together with its commented markup.

use chrono::{Datelike, NaiveDate};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use super::{require_page, require_url};
use crate::config::constants::{
    BASEBALL_REFERENCE_BASE_URL, BATTING_ROSTER_TABLE_ID, MONTH_ABBREVIATIONS,
    PITCHING_ROSTER_TABLE_ID, STATHEAD_BASE_URL,
};
use crate::engine::urls::build_url;
use crate::error::MinerError;
use crate::network::FastClient;
use crate::refinery::document::{attr, cell_text, parent_element};
use crate::refinery::tables::{header_labels, row_cells};
use crate::refinery::{
    resolve_id, select_body_row, select_row, CellLocator, CellValue, ExtractionError, Hand,
    RosterLayout, StatDocument, StatRecord,
};

static SELECTOR_BODY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody a").expect("Invalid body link selector"));
static SELECTOR_PARK_ADJUST_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href="/about/parkadjust.shtml"]"#).expect("Invalid park link selector")
});
static SELECTOR_STRONG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("Invalid strong selector"));

const SPLIT_COLUMN: &str = "Split";
const DATE_COLUMN: &str = "Date";
const TOTALS_TABLE: &str = "total";
const PITCHING_TOTALS_TABLE: &str = "total_extra";
const PLATOON_TABLE: &str = "plato";
const BATTING_LOG_TABLE: &str = "batting_gamelogs";
const PITCHING_LOG_TABLE: &str = "pitching_gamelogs";
const VERSUS_TABLE: &str = "result_table";

/// Which side of the ball a page describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    Batter,
    Pitcher,
}

impl PlayerRole {
    fn code(&self) -> &'static str {
        match self {
            PlayerRole::Batter => "b",
            PlayerRole::Pitcher => "p",
        }
    }

    fn roster_table(&self) -> &'static str {
        match self {
            PlayerRole::Batter => BATTING_ROSTER_TABLE_ID,
            PlayerRole::Pitcher => PITCHING_ROSTER_TABLE_ID,
        }
    }
}

/// Year selector of a split page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitYear {
    Career,
    Season(i32),
}

impl fmt::Display for SplitYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitYear::Career => f.write_str("Career"),
            SplitYear::Season(year) => write!(f, "{year}"),
        }
    }
}

/// Multi-year park adjustments from a team page (100 is neutral)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkFactors {
    pub hitter: i32,
    pub pitcher: i32,
}

// * URLs

pub fn season_roster_url(role: PlayerRole, year: i32) -> Option<String> {
    let kind = match role {
        PlayerRole::Batter => "batting",
        PlayerRole::Pitcher => "pitching",
    };
    build_url(
        BASEBALL_REFERENCE_BASE_URL,
        &format!("/leagues/MLB/{year}-standard-{kind}.shtml"),
        &[],
    )
}

pub fn split_url(player_id: &str, year: SplitYear, role: PlayerRole) -> Option<String> {
    let year = year.to_string();
    build_url(
        BASEBALL_REFERENCE_BASE_URL,
        "/players/split.fcgi",
        &[("id", player_id), ("year", &year), ("t", role.code())],
    )
}

pub fn game_log_url(player_id: &str, role: PlayerRole, year: i32) -> Option<String> {
    let year = year.to_string();
    build_url(
        BASEBALL_REFERENCE_BASE_URL,
        "/players/gl.fcgi",
        &[("id", player_id), ("t", role.code()), ("year", &year)],
    )
}

pub fn team_url(team: &str, year: i32) -> Option<String> {
    build_url(
        BASEBALL_REFERENCE_BASE_URL,
        &format!("/teams/{team}/{year}.shtml"),
        &[],
    )
}

// * Batter-vs-pitcher pages moved to Stathead
pub fn batter_vs_pitcher_url(batter_id: &str) -> Option<String> {
    build_url(
        STATHEAD_BASE_URL,
        "/baseball/batter_vs_pitcher.cgi",
        &[("batter", batter_id)],
    )
}

/// Game log row label for a date, e.g. "Apr 5"
pub fn game_log_label(date: NaiveDate) -> String {
    format!("{} {}", MONTH_ABBREVIATIONS[date.month0() as usize], date.day())
}

// * Parsers

fn roster_layout(role: PlayerRole) -> RosterLayout {
    // * Name is the first data cell, team the third (age sits between)
    RosterLayout::new(role.roster_table(), CellLocator::Index(0), CellLocator::Index(2))
}

pub fn hitter_id(doc: &StatDocument, full_name: &str, team: &str) -> Result<String, ExtractionError> {
    resolve_id(doc, &roster_layout(PlayerRole::Batter), full_name, team)
}

pub fn pitcher_id(doc: &StatDocument, full_name: &str, team: &str) -> Result<String, ExtractionError> {
    resolve_id(doc, &roster_layout(PlayerRole::Pitcher), full_name, team)
}

pub fn career_hitting(doc: &StatDocument) -> Result<StatRecord, ExtractionError> {
    select_row(doc, TOTALS_TABLE, "Career Totals", SPLIT_COLUMN)
}

/// Career line against pitchers throwing with `hand`
pub fn vs_hand_hitting(doc: &StatDocument, hand: Hand) -> Result<StatRecord, ExtractionError> {
    let label = match hand {
        Hand::Left => "vs LHP",
        Hand::Right => "vs RHP",
        Hand::Switch => {
            return Err(ExtractionError::table_row_not_found(
                "vs SHP",
                SPLIT_COLUMN,
                PLATOON_TABLE,
            ))
        }
    };
    select_row(doc, PLATOON_TABLE, label, SPLIT_COLUMN)
}

pub fn recent_hitting(doc: &StatDocument) -> Result<StatRecord, ExtractionError> {
    select_row(doc, TOTALS_TABLE, "Last 7 days", SPLIT_COLUMN)
}

// * Season total rows render the label in a header cell, so no column is dropped
pub fn season_hitting(doc: &StatDocument, year: i32) -> Result<StatRecord, ExtractionError> {
    select_body_row(doc, TOTALS_TABLE, &format!("{year} Totals"), SPLIT_COLUMN)
}

pub fn career_pitching(doc: &StatDocument) -> Result<StatRecord, ExtractionError> {
    select_row(doc, PITCHING_TOTALS_TABLE, "Career Totals", SPLIT_COLUMN)
}

pub fn season_pitching(doc: &StatDocument, year: i32) -> Result<StatRecord, ExtractionError> {
    select_body_row(doc, PITCHING_TOTALS_TABLE, &format!("{year} Totals"), SPLIT_COLUMN)
}

pub fn recent_pitching(doc: &StatDocument) -> Result<StatRecord, ExtractionError> {
    select_row(doc, PITCHING_TOTALS_TABLE, "Last 14 days", SPLIT_COLUMN)
}

pub fn hitting_game_log(doc: &StatDocument, date: NaiveDate) -> Result<StatRecord, ExtractionError> {
    select_row(doc, BATTING_LOG_TABLE, &game_log_label(date), DATE_COLUMN)
}

pub fn pitching_game_log(doc: &StatDocument, date: NaiveDate) -> Result<StatRecord, ExtractionError> {
    select_row(doc, PITCHING_LOG_TABLE, &game_log_label(date), DATE_COLUMN)
}

/// Career line of `batter_id` against `pitcher_id`.
///
/// The versus table has no stable row label: the row is the one holding the
/// link to the batter/pitcher pairing, and its data cells line up with the
/// headers after the name column.
pub fn vs_pitcher(
    doc: &StatDocument,
    batter_id: &str,
    pitcher_id: &str,
) -> Result<StatRecord, ExtractionError> {
    let table = doc
        .find_table(VERSUS_TABLE)
        .ok_or_else(|| ExtractionError::TableNotFound(VERSUS_TABLE.to_string()))?;
    let headers = header_labels(&table)
        .ok_or_else(|| ExtractionError::TableNotFound(VERSUS_TABLE.to_string()))?;

    let matching_href =
        format!("/baseball/batter_vs_pitcher.cgi?batter={batter_id}&pitcher={pitcher_id}&post=0");
    let not_found = || ExtractionError::table_row_not_found(&matching_href, "NULL", VERSUS_TABLE);

    let row = table
        .select(&SELECTOR_BODY_LINK)
        .find(|link| attr(link, "href") == Some(matching_href.as_str()))
        .and_then(|link| parent_element(&link))
        .and_then(|cell| parent_element(&cell))
        .ok_or_else(not_found)?;

    let cells: Vec<_> = row_cells(&row)
        .into_iter()
        .filter(|cell| cell.value().name() == "td")
        .collect();
    if cells.len() + 1 != headers.len() {
        return Err(not_found());
    }

    Ok(headers
        .iter()
        .skip(1)
        .zip(cells.iter())
        .map(|(label, cell)| (label.clone(), CellValue::from_text(&cell_text(cell))))
        .collect())
}

/// Multi-year hitter / pitcher park factors from a team page
pub fn park_factors(doc: &StatDocument) -> Option<ParkFactors> {
    let link = doc.html().select(&SELECTOR_PARK_ADJUST_LINK).next()?;
    let container = parent_element(&link).and_then(|parent| parent_element(&parent))?;

    for strong in container.select(&SELECTOR_STRONG) {
        if !cell_text(&strong).to_lowercase().contains("multi-year:") {
            continue;
        }
        let Some(text) = strong
            .next_sibling()
            .and_then(|node| node.value().as_text().map(|t| t.to_string()))
        else {
            continue;
        };

        // * "Batting - 104, Pitching - 103"
        let mut parts = text.split(',');
        let hitter = parts.next().and_then(park_factor);
        let pitcher = parts.next().and_then(park_factor);
        if let (Some(hitter), Some(pitcher)) = (hitter, pitcher) {
            return Some(ParkFactors { hitter, pitcher });
        }
    }

    None
}

fn park_factor(part: &str) -> Option<i32> {
    part.split('-')
        .nth(1)?
        .trim()
        .split(' ')
        .next()?
        .parse()
        .ok()
}

// * Client

/// Fetch + parse over Baseball-Reference pages
pub struct BaseballReference {
    client: Arc<FastClient>,
}

impl BaseballReference {
    pub fn new(client: Arc<FastClient>) -> Self {
        Self { client }
    }

    // * Raw markup; parsing happens after the await so no tree crosses a suspension point
    async fn page(&self, url: Option<String>, what: &str) -> Result<String, MinerError> {
        let url = require_url(url, what)?;
        let body = self.client.fetch(&url).await?;
        require_page(body, &url)
    }

    pub async fn hitter_id(&self, full_name: &str, team: &str, year: i32) -> Result<String, MinerError> {
        let body = self.page(season_roster_url(PlayerRole::Batter, year), "batting roster").await?;
        Ok(hitter_id(&StatDocument::parse_with_comments(&body), full_name, team)?)
    }

    pub async fn pitcher_id(&self, full_name: &str, team: &str, year: i32) -> Result<String, MinerError> {
        let body = self.page(season_roster_url(PlayerRole::Pitcher, year), "pitching roster").await?;
        Ok(pitcher_id(&StatDocument::parse_with_comments(&body), full_name, team)?)
    }

    pub async fn career_hitting(&self, player_id: &str) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Career, PlayerRole::Batter), "split")
            .await?;
        Ok(career_hitting(&StatDocument::parse_with_comments(&body))?)
    }

    pub async fn vs_hand_hitting(&self, player_id: &str, hand: Hand) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Career, PlayerRole::Batter), "split")
            .await?;
        Ok(vs_hand_hitting(&StatDocument::parse_with_comments(&body), hand)?)
    }

    pub async fn recent_hitting(&self, player_id: &str) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Career, PlayerRole::Batter), "split")
            .await?;
        Ok(recent_hitting(&StatDocument::parse_with_comments(&body))?)
    }

    pub async fn season_hitting(&self, player_id: &str, year: i32) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Season(year), PlayerRole::Batter), "split")
            .await?;
        Ok(season_hitting(&StatDocument::parse_with_comments(&body), year)?)
    }

    pub async fn career_pitching(&self, player_id: &str) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Career, PlayerRole::Pitcher), "split")
            .await?;
        Ok(career_pitching(&StatDocument::parse_with_comments(&body))?)
    }

    pub async fn season_pitching(&self, player_id: &str, year: i32) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Season(year), PlayerRole::Pitcher), "split")
            .await?;
        Ok(season_pitching(&StatDocument::parse_with_comments(&body), year)?)
    }

    pub async fn recent_pitching(&self, player_id: &str) -> Result<StatRecord, MinerError> {
        let body = self
            .page(split_url(player_id, SplitYear::Career, PlayerRole::Pitcher), "split")
            .await?;
        Ok(recent_pitching(&StatDocument::parse_with_comments(&body))?)
    }

    /// Game log line for `date`; `None` when the player did not appear that day
    pub async fn hitting_game_log(&self, player_id: &str, date: NaiveDate) -> Result<Option<StatRecord>, MinerError> {
        let body = self
            .page(game_log_url(player_id, PlayerRole::Batter, date.year()), "game log")
            .await?;
        absent_is_none(hitting_game_log(&StatDocument::parse_with_comments(&body), date))
    }

    pub async fn pitching_game_log(&self, player_id: &str, date: NaiveDate) -> Result<Option<StatRecord>, MinerError> {
        let body = self
            .page(game_log_url(player_id, PlayerRole::Pitcher, date.year()), "game log")
            .await?;
        absent_is_none(pitching_game_log(&StatDocument::parse_with_comments(&body), date))
    }

    pub async fn vs_pitcher(&self, batter_id: &str, pitcher_id: &str) -> Result<StatRecord, MinerError> {
        let body = self.page(batter_vs_pitcher_url(batter_id), "batter vs pitcher").await?;
        Ok(vs_pitcher(&StatDocument::parse_with_comments(&body), batter_id, pitcher_id)?)
    }

    pub async fn park_factors(&self, team: &str, year: i32) -> Result<Option<ParkFactors>, MinerError> {
        let body = self.page(team_url(team, year), "team").await?;
        Ok(park_factors(&StatDocument::parse_with_comments(&body)))
    }
}

fn absent_is_none(
    result: Result<StatRecord, ExtractionError>,
) -> Result<Option<StatRecord>, MinerError> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(e @ (ExtractionError::TableNotFound(_) | ExtractionError::TableRowNotFound { .. })) => {
            debug!(error = %e, "No game log entry");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
