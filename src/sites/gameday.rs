// * MLB Gameday adapter.
// * Day directories list game ids; each game carries per-player pitch-type XML
// * files with season tendencies. Off days have no files, so season stats are
// * searched backwards from the game date.

use chrono::{Datelike, Duration, NaiveDate};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::config::constants::{GAMEDAY_BASE_URL, GAMEDAY_LOOKBACK_DAYS, GAMEDAY_PITCH_FILES};
use crate::error::MinerError;
use crate::network::FastClient;
use crate::refinery::document::cell_text;
use crate::refinery::StatDocument;

static SELECTOR_GAME_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*=gid]").expect("Invalid game link selector"));
// * Descendant selectors: XML self-closing tags nest when parsed as HTML
static SELECTOR_SITUATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("std sit").expect("Invalid situation selector"));
static SELECTOR_PITCH_TYPE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("std types type").expect("Invalid pitch type selector"));

const GAME_TENDENCIES_FILE: &str = "pitchtendencies_game.xml";

pub type Attributes = BTreeMap<String, String>;

/// Season situation attributes per pitch type ("ch", "cu", "fa", ...)
pub type PitchSeasonStats = BTreeMap<String, Attributes>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamedayRole {
    Batters,
    Pitchers,
}

impl GamedayRole {
    fn directory(&self) -> &'static str {
        match self {
            GamedayRole::Batters => "batters",
            GamedayRole::Pitchers => "pitchers",
        }
    }
}

// * URLs

pub fn day_url(date: NaiveDate) -> String {
    format!(
        "{GAMEDAY_BASE_URL}year_{}/month_{:02}/day_{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

// * Game ids are listed with a trailing slash ("gid_2016_04_05_bosmlb_clemlb_1/")
pub fn player_directory_url(date: NaiveDate, game_id: &str, role: GamedayRole, player_id: &str) -> String {
    format!(
        "{}/{game_id}premium/{}/{player_id}/",
        day_url(date),
        role.directory()
    )
}

pub fn pitch_file_url(player_directory: &str, file: &str) -> String {
    format!("{player_directory}{file}.xml")
}

// * Parsers

pub fn game_ids(doc: &StatDocument) -> Vec<String> {
    doc.html()
        .select(&SELECTOR_GAME_LINK)
        .map(|link| cell_text(&link))
        .collect()
}

/// First game id of the day that involves `team`
pub fn game_for_team(game_ids: &[String], team: &str) -> Option<String> {
    game_ids.iter().find(|id| id.contains(team)).cloned()
}

/// Attributes of the season situation line (`std > sit`)
pub fn situation_attributes(doc: &StatDocument) -> Option<Attributes> {
    let sit = doc.html().select(&SELECTOR_SITUATION).next()?;
    Some(
        sit.value()
            .attrs()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

/// Per-pitch-type game tendencies (`std > types > type`) keyed by type id
pub fn pitch_tendencies(doc: &StatDocument) -> BTreeMap<String, Attributes> {
    doc.html()
        .select(&SELECTOR_PITCH_TYPE)
        .filter_map(|pitch| {
            let id = pitch.value().attr("id")?.to_string();
            let attrs = pitch
                .value()
                .attrs()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            Some((id, attrs))
        })
        .collect()
}

/// Probes each day before `start`, most recent first, up to `days` days back.
/// Returns the first day's result that is present.
pub async fn search_backwards<T, F, Fut>(
    start: NaiveDate,
    days: u32,
    mut probe: F,
) -> Result<Option<T>, MinerError>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<Option<T>, MinerError>>,
{
    for offset in 1..=i64::from(days) {
        let day = start - Duration::days(offset);
        if let Some(found) = probe(day).await? {
            debug!(start = %start, found_on = %day, "Backward search hit");
            return Ok(Some(found));
        }
    }
    Ok(None)
}

// * Client

pub struct Gameday {
    client: Arc<FastClient>,
}

impl Gameday {
    pub fn new(client: Arc<FastClient>) -> Self {
        Self { client }
    }

    async fn game_directory(
        &self,
        date: NaiveDate,
        team: &str,
        role: GamedayRole,
        player_id: &str,
    ) -> Result<Option<String>, MinerError> {
        let Some(body) = self.client.fetch(&day_url(date)).await? else {
            return Ok(None);
        };
        let ids = game_ids(&StatDocument::parse(&body));
        Ok(game_for_team(&ids, team).map(|game_id| player_directory_url(date, &game_id, role, player_id)))
    }

    /// Season tendencies as of `date`; `None` when the team did not play or a file is missing
    pub async fn season_pitch_stats(
        &self,
        role: GamedayRole,
        player_id: &str,
        team: &str,
        date: NaiveDate,
    ) -> Result<Option<PitchSeasonStats>, MinerError> {
        let Some(directory) = self.game_directory(date, team, role, player_id).await? else {
            return Ok(None);
        };

        let mut stats = PitchSeasonStats::new();
        for file in GAMEDAY_PITCH_FILES {
            let Some(body) = self.client.fetch(&pitch_file_url(&directory, file)).await? else {
                return Ok(None);
            };
            let Some(attrs) = situation_attributes(&StatDocument::parse(&body)) else {
                return Ok(None);
            };
            // * "pch" holds changeups, keyed as "ch"
            stats.insert(file.trim_start_matches('p').to_string(), attrs);
        }
        Ok(Some(stats))
    }

    /// Most recent season tendencies before `date`
    pub async fn previous_pitch_stats(
        &self,
        role: GamedayRole,
        player_id: &str,
        team: &str,
        date: NaiveDate,
    ) -> Result<Option<PitchSeasonStats>, MinerError> {
        search_backwards(date, GAMEDAY_LOOKBACK_DAYS, |day| {
            self.season_pitch_stats(role, player_id, team, day)
        })
        .await
    }

    /// A pitcher's per-pitch-type tendencies in the game on `date`
    pub async fn game_pitcher_tendencies(
        &self,
        player_id: &str,
        team: &str,
        date: NaiveDate,
    ) -> Result<Option<BTreeMap<String, Attributes>>, MinerError> {
        let Some(directory) = self
            .game_directory(date, team, GamedayRole::Pitchers, player_id)
            .await?
        else {
            return Ok(None);
        };
        let url = format!("{directory}{GAME_TENDENCIES_FILE}");
        let Some(body) = self.client.fetch(&url).await? else {
            return Ok(None);
        };
        Ok(Some(pitch_tendencies(&StatDocument::parse(&body))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_url_pads_month_and_day() {
        assert_eq!(
            day_url(date(2016, 4, 5)),
            "http://gd2.mlb.com/components/game/mlb/year_2016/month_04/day_05"
        );
    }

    #[test]
    fn test_pitch_file_url() {
        let dir = player_directory_url(
            date(2016, 4, 5),
            "gid_2016_04_05_bosmlb_clemlb_1/",
            GamedayRole::Batters,
            "120074",
        );
        assert_eq!(
            pitch_file_url(&dir, "pch"),
            "http://gd2.mlb.com/components/game/mlb/year_2016/month_04/day_05/gid_2016_04_05_bosmlb_clemlb_1/premium/batters/120074/pch.xml"
        );
    }

    #[test]
    fn test_game_ids_and_team_match() {
        let doc = StatDocument::parse(
            r#"<ul><li><a href="gid_2016_04_05_bosmlb_clemlb_1/"> gid_2016_04_05_bosmlb_clemlb_1/</a></li>
               <li><a href="gid_2016_04_05_nyamlb_houmlb_1/"> gid_2016_04_05_nyamlb_houmlb_1/</a></li>
               <li><a href="epg.xml">epg.xml</a></li></ul>"#,
        );
        let ids = game_ids(&doc);
        assert_eq!(ids.len(), 2);
        assert_eq!(
            game_for_team(&ids, "houmlb"),
            Some("gid_2016_04_05_nyamlb_houmlb_1/".to_string())
        );
        assert_eq!(game_for_team(&ids, "sfnmlb"), None);
    }

    #[test]
    fn test_situation_attributes() {
        let doc = StatDocument::parse(r#"<std><sit ab="40" h="12" avg=".300"></sit></std>"#);
        let attrs = situation_attributes(&doc).unwrap();
        assert_eq!(attrs.get("ab").map(String::as_str), Some("40"));
        assert_eq!(attrs.get("avg").map(String::as_str), Some(".300"));
    }

    #[test]
    fn test_pitch_tendencies_keyed_by_id() {
        let doc = StatDocument::parse(
            r#"<std><types><type id="FF" pct="55"></type><type id="SL" pct="30"></type></types></std>"#,
        );
        let tendencies = pitch_tendencies(&doc);
        assert_eq!(tendencies.len(), 2);
        assert_eq!(tendencies["SL"].get("pct").map(String::as_str), Some("30"));
    }

    #[tokio::test]
    async fn test_search_backwards_finds_most_recent_day() {
        let start = date(2016, 4, 10);
        let found = search_backwards(start, 25, |day| async move {
            Ok::<_, MinerError>(if day.day() <= 7 { Some(day) } else { None })
        })
        .await
        .unwrap();
        assert_eq!(found, Some(date(2016, 4, 7)));
    }

    #[tokio::test]
    async fn test_lookback_probes_each_earlier_day_once() {
        let start = date(2016, 5, 1);
        let probed = std::sync::Mutex::new(Vec::new());
        let found = search_backwards(start, GAMEDAY_LOOKBACK_DAYS, |day| {
            probed.lock().unwrap().push(day);
            async { Ok::<Option<()>, MinerError>(None) }
        })
        .await
        .unwrap();

        let probed = probed.into_inner().unwrap();
        assert_eq!(found, None);
        assert_eq!(probed.len(), 24);
        assert_eq!(probed.first(), Some(&date(2016, 4, 30)));
        assert_eq!(probed.last(), Some(&date(2016, 4, 7)));
    }

    #[tokio::test]
    async fn test_search_backwards_gives_up() {
        let found = search_backwards(date(2016, 4, 10), 3, |_| async { Ok::<Option<()>, MinerError>(None) })
            .await
            .unwrap();
        assert_eq!(found, None);
    }
}
