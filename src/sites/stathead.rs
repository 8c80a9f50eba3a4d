// * Stathead adapter.
// * Stathead is login-gated and script-rendered, so pages are read through a
// * BrowserSession. Play logs feed the plate-appearance interpreter.

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

use super::baseball_reference::PlayerRole;
use super::require_url;
use crate::config::constants::{HITTER_RELEVANT_STAT_KEYS, PLAYER_ID_SUFFIX, STATHEAD_BASE_URL};
use crate::engine::browser::{BrowserError, BrowserSession};
use crate::engine::urls::build_url;
use crate::error::MinerError;
use crate::refinery::document::{attr, cell_text, find_child, has_class};
use crate::refinery::identity::parse_roster_row;
use crate::refinery::tables::{build_record, header_labels, row_cells};
use crate::refinery::{
    derive_player_id, extract_summary_row, interpret, parse_pitch_count, parse_play_date,
    parse_runners, CellLocator, CellValue, ExtractionError, PlateAppearanceOutcome, PlayContext,
    PlayerIdentity, RosterLayout, RowLayout, StatDocument, StatRecord, SummaryMarker,
};
use crate::ops::telemetry;

static SELECTOR_BODY_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("Invalid body row selector"));
static SELECTOR_TH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("Invalid th selector"));
static SELECTOR_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Invalid td selector"));

static PATTERN_OPPONENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"player_id2=([a-z0-9'._-]*)").expect("Invalid opponent id regex")
});

pub const LOGIN_PATH: &str = "/users/login.cgi";
pub const REGULAR_SEASON_PLAY_TABLE: &str = "stats_bvp_pa_rs";
pub const POSTSEASON_PLAY_TABLE: &str = "stats_bvp_pa_po";
pub const VERSUS_SUMMARY_TABLE: &str = "stats_bvp_sum_p_rs";
pub const FINDER_RESULTS_TABLE: &str = "stats";

const USERNAME_FIELD: &str = "#username";
const PASSWORD_FIELD: &str = "#password";
const LOGIN_BUTTON: &str = "#sh-login-button";
const LOGIN_WAIT: Duration = Duration::from_secs(20);

// * Game finders leave the home/away column header blank and mark road games with "@"
pub const HOME_COLUMN: &str = "IsHome";
const AWAY_MARKER: &str = "@";
const PLAYER_COLUMN: &str = "Player";

// * Finder searches match on at most this many leading name characters
const NAME_PREFIX_LEN: usize = 4;

/// Stathead account
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One player from a season finder with their playing-time count (PA or BF)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEntry {
    pub identity: PlayerIdentity,
    pub count: i64,
}

/// Career totals of a hitter against one opponent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersusEntry {
    pub opponent_id: String,
    pub plate_appearances: i64,
    pub runs_batted_in: i64,
}

/// One game line from a season game finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogEntry {
    /// Baseball-Reference id taken from the Player link
    pub player_id: Option<String>,
    pub is_home: bool,
    /// Every column of the row, the home/away column under `IsHome`
    pub stats: StatRecord,
}

// * URLs

pub fn login_url() -> Option<String> {
    build_url(STATHEAD_BASE_URL, LOGIN_PATH, &[])
}

/// Every plate appearance between a hitter and a pitcher, postseason included
pub fn versus_play_log_url(hitter_id: &str, pitcher_id: &str) -> Option<String> {
    build_url(
        STATHEAD_BASE_URL,
        "/baseball/versus-finder.cgi",
        &[
            ("request", "1"),
            ("post", "1"),
            ("player_id1", hitter_id),
            ("player_id2", pitcher_id),
        ],
    )
}

pub fn versus_summary_url(hitter_id: &str) -> Option<String> {
    build_url(
        STATHEAD_BASE_URL,
        "/baseball/versus-finder.cgi",
        &[("request", "1"), ("player_id1", hitter_id)],
    )
}

pub fn batting_season_finder_url(year_min: i32, year_max: i32) -> Option<String> {
    season_finder_url("player-batting-season-finder.cgi", year_min, year_max)
}

pub fn pitching_season_finder_url(year_min: i32, year_max: i32) -> Option<String> {
    season_finder_url("player-pitching-season-finder.cgi", year_min, year_max)
}

fn season_finder_url(finder: &str, year_min: i32, year_max: i32) -> Option<String> {
    let year_min = year_min.to_string();
    let year_max = year_max.to_string();
    build_url(
        STATHEAD_BASE_URL,
        &format!("/baseball/{finder}"),
        &[("request", "1"), ("year_min", &year_min), ("year_max", &year_max)],
    )
}

/// Combined career line search by name prefix
pub fn career_finder_url(full_name: &str, postseason: bool) -> Option<String> {
    let mut names = full_name.split_whitespace();
    let first = name_prefix(names.next()?);
    let last = name_prefix(names.next()?);

    let mut params = vec![
        ("request", "1"),
        ("match", "player_season_combined"),
        ("first_name_starts", first.as_str()),
        ("last_name_starts", last.as_str()),
    ];
    if postseason {
        params.push(("comp_type", "post"));
    }
    build_url(
        STATHEAD_BASE_URL,
        "/baseball/player-batting-season-finder.cgi",
        &params,
    )
}

/// Every game a player appeared in during `year`
pub fn game_log_finder_url(role: PlayerRole, player_id: &str, year: i32) -> Option<String> {
    let path = match role {
        PlayerRole::Batter => "/baseball/player-batting-game-finder.cgi",
        PlayerRole::Pitcher => "/baseball/player-pitching-game-finder.cgi",
    };
    let year = year.to_string();
    build_url(
        STATHEAD_BASE_URL,
        path,
        &[
            ("request", "1"),
            ("player_id", player_id),
            ("timeframe", "seasons"),
            ("year_min", &year),
            ("year_max", &year),
        ],
    )
}

fn name_prefix(name: &str) -> String {
    name.chars().take(NAME_PREFIX_LEN).collect()
}

// * Parsers

fn data_cell<'a>(row: &ElementRef<'a>, data_stat: &str) -> Option<ElementRef<'a>> {
    row.select(&SELECTOR_TD)
        .find(|td| td.value().attr("data-stat") == Some(data_stat))
}

fn data_text(row: &ElementRef<'_>, data_stat: &str) -> Option<String> {
    data_cell(row, data_stat).map(|cell| cell_text(&cell))
}

/// Reconstructs the plate appearances listed in a play-by-play table.
///
/// Team and date cells are only filled on the first row of a game, so both
/// carry forward until the next non-empty cell. Divider rows carry a class and
/// are skipped.
pub fn parse_play_log(
    doc: &StatDocument,
    table_id: &str,
    hitter_surname: &str,
) -> Result<Vec<PlateAppearanceOutcome>, ExtractionError> {
    let table = doc
        .find_table(table_id)
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;

    let mut hitter_team: Option<String> = None;
    let mut pitcher_team: Option<String> = None;
    let mut date = None;
    let mut outcomes = Vec::new();

    for row in table.select(&SELECTOR_BODY_ROW) {
        if row.value().classes().next().is_some() {
            continue;
        }
        let Some(description) = data_text(&row, "play_desc") else {
            continue;
        };

        if let Some(team) = data_text(&row, "event_b_team").filter(|t| !t.is_empty()) {
            hitter_team = Some(team);
        }
        if let Some(team) = data_text(&row, "event_p_team").filter(|t| !t.is_empty()) {
            pitcher_team = Some(team);
        }
        if let Some(parsed) = data_text(&row, "date").as_deref().and_then(parse_play_date) {
            date = Some(parsed);
        }

        let context = PlayContext {
            hitter_team: hitter_team.clone(),
            pitcher_team: pitcher_team.clone(),
            date,
            sequence: row
                .select(&SELECTOR_TH)
                .next()
                .and_then(|th| cell_text(&th).parse().ok()),
            score: data_text(&row, "team_rel_score"),
            inning: data_text(&row, "inning"),
            outs: data_text(&row, "outs").and_then(|outs| outs.parse().ok()),
            runners: data_text(&row, "runners_on_bases")
                .map(|text| parse_runners(&text))
                .unwrap_or_default(),
            count: data_text(&row, "pitches_pbp").and_then(|text| parse_pitch_count(&text)),
        };

        outcomes.push(interpret(&description, hitter_surname).with_context(context));
    }

    debug!(table_id = %table_id, plays = outcomes.len(), "Play log parsed");
    Ok(outcomes)
}

/// Players listed by a season finder with their `count_stat` cell
/// (`b_pa` for hitters, `p_bfp` for pitchers). Malformed rows are skipped.
pub fn season_identifiers(doc: &StatDocument, count_stat: &str) -> Vec<SeasonEntry> {
    let layout = RosterLayout::new(
        FINDER_RESULTS_TABLE,
        CellLocator::data_stat("name_display"),
        CellLocator::data_stat("teams_played_for"),
    );
    let Some(table) = doc.find_table(&layout.table_id) else {
        debug!(table_id = %layout.table_id, "Finder results not found");
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut skipped = 0u64;
    for row in table.select(&SELECTOR_BODY_ROW) {
        if has_class(&row, &layout.divider_class) {
            continue;
        }
        let identity = parse_roster_row(&row, &layout).ok();
        let count = data_text(&row, count_stat).and_then(|text| CellValue::from_text(&text).as_i64());
        match (identity, count) {
            (Some(identity), Some(count)) => entries.push(SeasonEntry { identity, count }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        info!(skipped, kept = entries.len(), "Season finder skipped rows");
        telemetry::record_roster_rows_skipped(skipped);
    }
    entries
}

/// Career totals from the finder's summary footer, restricted to the hitter
/// categories. A player with no summary row reads as all zeros.
pub fn career_totals(doc: &StatDocument, table_id: &str) -> Result<StatRecord, ExtractionError> {
    let summary = extract_summary_row(
        doc,
        table_id,
        &SummaryMarker::default(),
        &HITTER_RELEVANT_STAT_KEYS,
    )?;

    Ok(HITTER_RELEVANT_STAT_KEYS
        .iter()
        .map(|key| (*key, summary.get(key).cloned().unwrap_or_default()))
        .collect())
}

/// Game lines from a season game finder.
///
/// Cells line up with the header by position. Repeated header rows carry more
/// than the rank header cell and are skipped, as are rows of the wrong width.
pub fn parse_game_logs(doc: &StatDocument) -> Result<Vec<GameLogEntry>, ExtractionError> {
    let not_found = || ExtractionError::TableNotFound(FINDER_RESULTS_TABLE.to_string());
    let table = doc.find_table(FINDER_RESULTS_TABLE).ok_or_else(not_found)?;
    let headers: Vec<String> = header_labels(&table)
        .ok_or_else(not_found)?
        .into_iter()
        .map(|label| if label.is_empty() { HOME_COLUMN.to_string() } else { label })
        .collect();
    let player_column = headers.iter().position(|label| label == PLAYER_COLUMN);

    let mut entries = Vec::new();
    let mut rejected = 0u64;
    for row in table.select(&SELECTOR_BODY_ROW) {
        if row.select(&SELECTOR_TH).count() > 1 {
            continue;
        }
        let cells = row_cells(&row);
        if cells.len() != headers.len() {
            rejected += 1;
            continue;
        }

        let stats = build_record(&headers, &cells, RowLayout::Full);
        let is_home = stats.get(HOME_COLUMN).and_then(|value| value.as_text()) != Some(AWAY_MARKER);
        let player_id = player_column
            .and_then(|index| find_child(&cells[index], "a"))
            .and_then(|link| attr(&link, "href").and_then(|href| derive_player_id(href, PLAYER_ID_SUFFIX)));

        entries.push(GameLogEntry {
            player_id,
            is_home,
            stats,
        });
    }

    debug!(games = entries.len(), rejected, "Game finder parsed");
    telemetry::record_table_extracted();
    telemetry::record_rows_rejected(rejected);
    Ok(entries)
}

/// Opponents a hitter has faced, with PA and RBI against each
pub fn versus_summary(doc: &StatDocument) -> Vec<VersusEntry> {
    let Some(table) = doc.find_table(VERSUS_SUMMARY_TABLE) else {
        return Vec::new();
    };

    table
        .select(&SELECTOR_BODY_ROW)
        .filter_map(|row| {
            let link = row.select(&SELECTOR_TD).next()?.value().attr("data-append-csv")?;
            let opponent_id = PATTERN_OPPONENT_ID.captures(link)?.get(1)?.as_str().to_string();
            Some(VersusEntry {
                opponent_id,
                plate_appearances: data_text(&row, "b_pa")?.parse().ok()?,
                runs_batted_in: data_text(&row, "b_rbi")?.parse().ok()?,
            })
        })
        .collect()
}

// * Client

/// Stathead pages read through a logged-in browser session
pub struct Stathead<S: BrowserSession> {
    session: S,
}

impl<S: BrowserSession> Stathead<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), MinerError> {
        login(&self.session, credentials).await?;
        Ok(())
    }

    // * Navigates and returns the raw markup for synchronous parsing
    async fn page(&self, url: Option<String>, what: &str) -> Result<String, MinerError> {
        let url = require_url(url, what)?;
        self.session.navigate(&url).await?;
        Ok(self.session.content().await?)
    }

    /// Regular season then postseason plate appearances between two players
    pub async fn play_log(
        &self,
        hitter_id: &str,
        hitter_surname: &str,
        pitcher_id: &str,
    ) -> Result<Vec<PlateAppearanceOutcome>, MinerError> {
        let markup = self
            .page(versus_play_log_url(hitter_id, pitcher_id), "versus finder")
            .await?;
        let doc = StatDocument::parse_with_comments(&markup);

        let mut plays = Vec::new();
        for table_id in [REGULAR_SEASON_PLAY_TABLE, POSTSEASON_PLAY_TABLE] {
            match parse_play_log(&doc, table_id, hitter_surname) {
                Ok(found) => plays.extend(found),
                // * Players who never met in a given season type have no table
                Err(ExtractionError::TableNotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(plays)
    }

    pub async fn season_hitters(&self, year_min: i32, year_max: i32) -> Result<Vec<SeasonEntry>, MinerError> {
        let markup = self
            .page(batting_season_finder_url(year_min, year_max), "batting season finder")
            .await?;
        Ok(season_identifiers(&StatDocument::parse_with_comments(&markup), "b_pa"))
    }

    pub async fn season_pitchers(&self, year_min: i32, year_max: i32) -> Result<Vec<SeasonEntry>, MinerError> {
        let markup = self
            .page(pitching_season_finder_url(year_min, year_max), "pitching season finder")
            .await?;
        Ok(season_identifiers(&StatDocument::parse_with_comments(&markup), "p_bfp"))
    }

    pub async fn career_hitting(&self, full_name: &str, postseason: bool) -> Result<StatRecord, MinerError> {
        let markup = self
            .page(career_finder_url(full_name, postseason), "career finder")
            .await?;
        Ok(career_totals(&StatDocument::parse_with_comments(&markup), FINDER_RESULTS_TABLE)?)
    }

    pub async fn season_hitting_game_logs(&self, player_id: &str, year: i32) -> Result<Vec<GameLogEntry>, MinerError> {
        self.game_logs(PlayerRole::Batter, player_id, year).await
    }

    pub async fn season_pitching_game_logs(&self, player_id: &str, year: i32) -> Result<Vec<GameLogEntry>, MinerError> {
        self.game_logs(PlayerRole::Pitcher, player_id, year).await
    }

    async fn game_logs(&self, role: PlayerRole, player_id: &str, year: i32) -> Result<Vec<GameLogEntry>, MinerError> {
        let markup = self
            .page(game_log_finder_url(role, player_id, year), "game finder")
            .await?;
        Ok(parse_game_logs(&StatDocument::parse_with_comments(&markup))?)
    }

    pub async fn versus_summary(&self, hitter_id: &str) -> Result<Vec<VersusEntry>, MinerError> {
        let markup = self.page(versus_summary_url(hitter_id), "versus summary").await?;
        Ok(versus_summary(&StatDocument::parse_with_comments(&markup)))
    }
}

/// Fills the login form and submits it
pub async fn login<S: BrowserSession + ?Sized>(
    session: &S,
    credentials: &Credentials,
) -> Result<(), BrowserError> {
    let url = login_url().ok_or_else(|| BrowserError::Navigation(LOGIN_PATH.to_string()))?;
    session.navigate(&url).await?;

    session.wait_for_element(USERNAME_FIELD, LOGIN_WAIT).await?;
    session.type_into(USERNAME_FIELD, &credentials.username).await?;

    session.wait_for_element(PASSWORD_FIELD, LOGIN_WAIT).await?;
    session.type_into(PASSWORD_FIELD, &credentials.password).await?;

    session.wait_for_element(LOGIN_BUTTON, LOGIN_WAIT).await?;
    session.click(LOGIN_BUTTON).await?;

    info!(user = %credentials.username, "Stathead login submitted");
    Ok(())
}
