// * Rotowire daily lineups.
// * One `.lineup.is-mlb` card per game: team abbreviations on top, the two
// * batting orders with their starting pitchers in the middle, weather and
// * umpire in the extra section.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use super::require_page;
use crate::config::constants::{LINEUP_SIZE, ROTOWIRE_LINEUPS_URL};
use crate::error::MinerError;
use crate::network::FastClient;
use crate::refinery::document::{attr, cell_text};
use crate::refinery::{Hand, StatDocument};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid lineup selector")
}

static SELECTOR_GAME: LazyLock<Selector> = LazyLock::new(|| selector(".lineup.is-mlb"));
static SELECTOR_AWAY_ABBR: LazyLock<Selector> =
    LazyLock::new(|| selector(".lineup__top .lineup__team.is-visit .lineup__abbr"));
static SELECTOR_HOME_ABBR: LazyLock<Selector> =
    LazyLock::new(|| selector(".lineup__top .lineup__team.is-home .lineup__abbr"));
static SELECTOR_TIME: LazyLock<Selector> = LazyLock::new(|| selector(".lineup__time"));
static SELECTOR_AWAY_LIST: LazyLock<Selector> =
    LazyLock::new(|| selector(".lineup__main ul.lineup__list.is-visit"));
static SELECTOR_HOME_LIST: LazyLock<Selector> =
    LazyLock::new(|| selector(".lineup__main ul.lineup__list.is-home"));
static SELECTOR_PLAYER: LazyLock<Selector> = LazyLock::new(|| selector("li.lineup__player"));
static SELECTOR_PITCHER: LazyLock<Selector> =
    LazyLock::new(|| selector(".lineup__player-highlight-name"));
static SELECTOR_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static SELECTOR_POSITION: LazyLock<Selector> = LazyLock::new(|| selector(".lineup__pos"));
static SELECTOR_BATS: LazyLock<Selector> = LazyLock::new(|| selector(".lineup__bats"));
static SELECTOR_THROWS: LazyLock<Selector> = LazyLock::new(|| selector(".lineup__throws"));
static SELECTOR_WEATHER: LazyLock<Selector> =
    LazyLock::new(|| selector(".lineup__extra .lineup__weather .lineup__weather-text"));
static SELECTOR_UMPIRE: LazyLock<Selector> = LazyLock::new(|| selector(".lineup__umpire a"));

static PATTERN_TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?[0-9]+)°").expect("Invalid temperature regex"));

const PITCHER_POSITION: &str = "P";

/// A player as listed on a lineup card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupPlayer {
    pub rotowire_id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    /// Batting hand for hitters, throwing hand for pitchers
    pub hand: Option<Hand>,
}

/// One scheduled game with both confirmed lineups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_date: NaiveDate,
    /// Eastern start time, 24h "HH:MM"
    pub game_time: String,
    pub away_team: String,
    pub home_team: String,
    pub away_lineup: Vec<LineupPlayer>,
    pub home_lineup: Vec<LineupPlayer>,
    pub away_pitcher: LineupPlayer,
    pub home_pitcher: LineupPlayer,
    pub umpire: Option<String>,
    /// mph, positive blowing out, negative blowing in
    pub wind_speed: i32,
    /// Fahrenheit
    pub temperature: Option<i32>,
}

impl Game {
    /// Both batting orders are complete
    pub fn is_valid(&self) -> bool {
        self.away_lineup.len() == LINEUP_SIZE && self.home_lineup.len() == LINEUP_SIZE
    }
}

/// "7:05 PM ET" as "19:05"
pub fn normalize_game_time(text: &str) -> Option<String> {
    let trimmed = text.replace("ET", "");
    NaiveTime::parse_from_str(trimmed.trim(), "%I:%M %p")
        .ok()
        .map(|time| time.format("%H:%M").to_string())
}

/// Wind speed signed by direction: "8 mph Out" is 8, "8 mph In" is -8, anything else 0
pub fn wind_speed(weather: &str) -> i32 {
    let words: Vec<&str> = weather.split_whitespace().collect();
    let speed = || {
        words
            .len()
            .checked_sub(3)
            .and_then(|i| words[i].parse::<i32>().ok())
            .unwrap_or(0)
    };
    match words.last() {
        Some(&"Out") => speed(),
        Some(&"In") => -speed(),
        _ => 0,
    }
}

pub fn temperature(weather: &str) -> Option<i32> {
    PATTERN_TEMPERATURE
        .captures(weather)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

// * Player links end in "<name-slug>-<id>"
fn rotowire_id(node: &ElementRef<'_>) -> Option<String> {
    let link = node.select(&SELECTOR_LINK).next()?;
    let href = attr(&link, "href")?;
    let id = href.rsplit('/').next()?.rsplit('-').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn child_text(node: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector).next().map(|el| cell_text(&el))
}

fn parse_hitter(node: &ElementRef<'_>, team: &str) -> Option<LineupPlayer> {
    let link = node.select(&SELECTOR_LINK).next()?;
    // * Long names are shortened in the link text; the title keeps the full name
    let name = attr(&link, "title")
        .map(str::to_string)
        .unwrap_or_else(|| cell_text(&link));

    Some(LineupPlayer {
        rotowire_id: rotowire_id(node)?,
        name,
        team: team.to_string(),
        position: child_text(node, &SELECTOR_POSITION)?,
        hand: child_text(node, &SELECTOR_BATS).and_then(|code| Hand::from_code(&code)),
    })
}

fn parse_pitcher(list: &ElementRef<'_>, team: &str) -> Option<LineupPlayer> {
    let node = list.select(&SELECTOR_PITCHER).next()?;
    let link = node.select(&SELECTOR_LINK).next()?;

    Some(LineupPlayer {
        rotowire_id: rotowire_id(&node)?,
        name: cell_text(&link),
        team: team.to_string(),
        position: PITCHER_POSITION.to_string(),
        hand: child_text(&node, &SELECTOR_THROWS).and_then(|code| Hand::from_code(&code)),
    })
}

fn parse_game(card: &ElementRef<'_>, game_date: NaiveDate) -> Option<Game> {
    let away_team = child_text(card, &SELECTOR_AWAY_ABBR)?;
    let home_team = child_text(card, &SELECTOR_HOME_ABBR)?;

    let Some(game_time) = child_text(card, &SELECTOR_TIME).and_then(|t| normalize_game_time(&t)) else {
        warn!(away = %away_team, home = %home_team, "Game time could not be parsed");
        return None;
    };

    let away_list = card.select(&SELECTOR_AWAY_LIST).next()?;
    let home_list = card.select(&SELECTOR_HOME_LIST).next()?;

    let away_lineup: Vec<LineupPlayer> = away_list
        .select(&SELECTOR_PLAYER)
        .filter_map(|node| parse_hitter(&node, &away_team))
        .collect();
    let home_lineup: Vec<LineupPlayer> = home_list
        .select(&SELECTOR_PLAYER)
        .filter_map(|node| parse_hitter(&node, &home_team))
        .collect();

    let away_pitcher = parse_pitcher(&away_list, &away_team)?;
    let home_pitcher = parse_pitcher(&home_list, &home_team)?;

    let weather = child_text(card, &SELECTOR_WEATHER).unwrap_or_default();

    Some(Game {
        game_date,
        game_time,
        away_lineup,
        home_lineup,
        away_pitcher,
        home_pitcher,
        umpire: child_text(card, &SELECTOR_UMPIRE),
        wind_speed: wind_speed(&weather),
        temperature: temperature(&weather),
        away_team,
        home_team,
    })
}

/// Every game on the page with two complete batting orders and both starters
pub fn parse_daily_lineups(doc: &StatDocument, game_date: NaiveDate) -> Vec<Game> {
    let mut games = Vec::new();
    for card in doc.html().select(&SELECTOR_GAME) {
        let Some(game) = parse_game(&card, game_date) else {
            debug!("Skipping lineup card without teams, time or pitchers");
            continue;
        };
        if !game.is_valid() {
            info!(
                away = %game.away_team,
                home = %game.home_team,
                away_hitters = game.away_lineup.len(),
                home_hitters = game.home_lineup.len(),
                "Lineups incomplete, skipping game"
            );
            continue;
        }
        games.push(game);
    }
    games
}

/// Daily lineups client
pub struct Rotowire {
    client: Arc<FastClient>,
}

impl Rotowire {
    pub fn new(client: Arc<FastClient>) -> Self {
        Self { client }
    }

    pub async fn daily_lineups(&self, game_date: NaiveDate) -> Result<Vec<Game>, MinerError> {
        self.lineups_from(ROTOWIRE_LINEUPS_URL, game_date).await
    }

    pub async fn lineups_from(&self, url: &str, game_date: NaiveDate) -> Result<Vec<Game>, MinerError> {
        let body = require_page(self.client.fetch(url).await?, url)?;
        Ok(parse_daily_lineups(&StatDocument::parse(&body), game_date))
    }
}
