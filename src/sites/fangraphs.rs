// * FanGraphs adapter: team-page id lookup and pitch-type season splits.
// * Team pages are plain HTML; the pitch-type splits table is rendered by
// * script behind a promo modal, so it is read through a BrowserSession.

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{require_page, require_url};
use crate::config::constants::{FANGRAPHS_BASE_URL, PAGE_TIMEOUT_MS, PITCH_TYPE_CODES};
use crate::engine::browser::{BrowserError, BrowserSession};
use crate::engine::urls::{build_url, normalize_url};
use crate::error::MinerError;
use crate::network::FastClient;
use crate::refinery::document::{attr, cell_text};
use crate::refinery::{CellValue, ExtractionError, StatDocument, StatRecord};

static SELECTOR_TEAM_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.team-stats-table tr").expect("Invalid team row selector"));
static SELECTOR_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("Invalid link selector"));
static SELECTOR_SEASON_ROW: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#standard .row-mlb-season").expect("Invalid season row selector")
});
static SELECTOR_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Invalid td selector"));

// * Rows start with "First Last"
static PATTERN_ROW_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z.']* [a-zA-Z.']*)").expect("Invalid row name regex"));

const SPLITS_TABLE: &str = "standard";
const SPLITS_TABLE_SELECTOR: &str = "#standard";
const SEASON_STAT: &str = "Season";

const PROMO_CLOSE_BUTTON: &str = ".loneoak-CloseButton";
const PROMO_WAIT: Duration = Duration::from_secs(2);
const TABLE_WAIT: Duration = Duration::from_millis(PAGE_TIMEOUT_MS);

/// FanGraphs player URLs need the name slug, numeric id and position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanGraphsId {
    /// "mookie-betts/13611"
    pub player_path: String,
    pub position: String,
}

pub fn team_stats_url(team_slug: &str, year: i32) -> Option<String> {
    let year = year.to_string();
    build_url(
        FANGRAPHS_BASE_URL,
        &format!("/teams/{team_slug}/stats"),
        &[("season", &year)],
    )
}

pub fn pitch_type_splits_url(id: &FanGraphsId, pitch_type: &str) -> Option<String> {
    build_url(
        FANGRAPHS_BASE_URL,
        &format!("/players/{}/pitch-type-splits", id.player_path),
        &[
            ("position", id.position.as_str()),
            ("data", "pi"),
            ("pitchtype", pitch_type),
        ],
    )
}

pub fn is_pitch_type(code: &str) -> bool {
    PITCH_TYPE_CODES.contains(&code)
}

/// Finds `full_name` on a team stats page and reads id and position from the profile link
pub fn hitter_id(doc: &StatDocument, full_name: &str) -> Result<FanGraphsId, ExtractionError> {
    for row in doc.html().select(&SELECTOR_TEAM_ROW) {
        let text = cell_text(&row);
        let Some(name) = PATTERN_ROW_NAME.captures(&text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        if name.as_str() != full_name {
            continue;
        }

        let Some(href) = row.select(&SELECTOR_LINK).next().and_then(|link| attr(&link, "href")) else {
            continue;
        };
        let Some(link) = normalize_url(href, FANGRAPHS_BASE_URL).and_then(|u| Url::parse(&u).ok()) else {
            continue;
        };

        let mut player_id = None;
        let mut position = None;
        for (key, value) in link.query_pairs() {
            match key.as_ref() {
                "playerid" => player_id = Some(value.into_owned()),
                "position" => position = Some(value.into_owned()),
                _ => {}
            }
        }

        if let (Some(player_id), Some(position)) = (player_id, position) {
            return Ok(FanGraphsId {
                player_path: format!("{}/{player_id}", full_name.to_lowercase().replace(' ', "-")),
                position,
            });
        }
    }

    Err(ExtractionError::PlayerNameNotFound(full_name.to_string()))
}

/// The MLB season row for `year`, keyed by each cell's `data-stat`
pub fn pitch_type_season(doc: &StatDocument, year: i32) -> Result<StatRecord, ExtractionError> {
    if doc.select_first(&format!("#{SPLITS_TABLE}")).is_none() {
        return Err(ExtractionError::TableNotFound(SPLITS_TABLE.to_string()));
    }
    let wanted = year.to_string();

    for row in doc.html().select(&SELECTOR_SEASON_ROW) {
        let is_season = row.select(&SELECTOR_TD).any(|td| {
            attr(&td, "data-stat") == Some(SEASON_STAT) && cell_text(&td) == wanted
        });
        if !is_season {
            continue;
        }

        return Ok(row
            .select(&SELECTOR_TD)
            .filter_map(|td| {
                let key = attr(&td, "data-stat")?;
                Some((key.to_string(), CellValue::from_text(&cell_text(&td))))
            })
            .collect());
    }

    Err(ExtractionError::table_row_not_found(&wanted, SEASON_STAT, SPLITS_TABLE))
}

/// FanGraphs client: plain fetches for team pages, a browser for splits
pub struct FanGraphs<S: BrowserSession> {
    client: Arc<FastClient>,
    session: S,
}

impl<S: BrowserSession> FanGraphs<S> {
    pub fn new(client: Arc<FastClient>, session: S) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub async fn hitter_id(&self, full_name: &str, team_slug: &str, year: i32) -> Result<FanGraphsId, MinerError> {
        let url = require_url(team_stats_url(team_slug, year), "team stats")?;
        let body = require_page(self.client.fetch(&url).await?, &url)?;
        Ok(hitter_id(&StatDocument::parse(&body), full_name)?)
    }

    pub async fn pitch_type_season(
        &self,
        id: &FanGraphsId,
        pitch_type: &str,
        year: i32,
    ) -> Result<StatRecord, MinerError> {
        if !is_pitch_type(pitch_type) {
            return Err(MinerError::Parse(format!("pitch type {pitch_type}")));
        }
        let url = require_url(pitch_type_splits_url(id, pitch_type), "pitch type splits")?;

        self.session.navigate(&url).await?;
        dismiss_promo(&self.session).await?;
        self.session
            .wait_for_element(SPLITS_TABLE_SELECTOR, TABLE_WAIT)
            .await?;
        let markup = self.session.content().await?;

        Ok(pitch_type_season(&StatDocument::parse(&markup), year)?)
    }
}

// * The promo modal only shows on some visits
async fn dismiss_promo<S: BrowserSession + ?Sized>(session: &S) -> Result<(), BrowserError> {
    match session.wait_for_element(PROMO_CLOSE_BUTTON, PROMO_WAIT).await {
        Ok(()) => session.click(PROMO_CLOSE_BUTTON).await,
        Err(BrowserError::Timeout(_)) => {
            debug!("FanGraphs promo modal not present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_stats_url() {
        assert_eq!(
            team_stats_url("red-sox", 2023).unwrap(),
            "https://www.fangraphs.com/teams/red-sox/stats?season=2023"
        );
    }

    #[test]
    fn test_pitch_type_codes() {
        assert!(is_pitch_type("SL"));
        assert!(!is_pitch_type("XX"));
    }

    #[test]
    fn test_hitter_id_from_team_page() {
        let doc = StatDocument::parse(
            r#"<div class="team-stats-table"><table>
                <tr><td><a href="statss.aspx?playerid=13611&amp;position=OF">Mookie Betts</a></td><td>150</td></tr>
               </table></div>"#,
        );
        let id = hitter_id(&doc, "Mookie Betts").unwrap();
        assert_eq!(id.player_path, "mookie-betts/13611");
        assert_eq!(id.position, "OF");
    }

    #[test]
    fn test_pitch_type_season_blank_cells() {
        let doc = StatDocument::parse(
            r#"<div id="standard"><table><tbody>
                <tr class="row-mlb-season"><td data-stat="Season">2022</td><td data-stat="wSL">4.1</td></tr>
                <tr class="row-mlb-season"><td data-stat="Season">2023</td><td data-stat="wSL"></td></tr>
               </tbody></table></div>"#,
        );
        let season = pitch_type_season(&doc, 2023).unwrap();
        assert_eq!(season.get("wSL"), Some(&CellValue::Blank));
        assert_eq!(season.get_i64("Season"), Some(2023));
        assert!(pitch_type_season(&doc, 2021).is_err());
    }

    #[test]
    fn test_hitter_id_unknown_player() {
        let doc = StatDocument::parse(r#"<div class="team-stats-table"><table></table></div>"#);
        assert_eq!(
            hitter_id(&doc, "Nobody Here"),
            Err(ExtractionError::PlayerNameNotFound("Nobody Here".to_string()))
        );
    }
}
