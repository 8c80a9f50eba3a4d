// * Plate-appearance interpreter.
// * Classifies one free-text play description into a stat line using ordered,
// * first-match-wins rules. Hits are detected independently of that chain.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::sync::LazyLock;
use tracing::warn;

use crate::ops::telemetry;

static PATTERN_ERROR_REACH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"on E[0-9]").expect("Invalid error reach regex"));

static PATTERN_PITCH_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+) \(([0-9]+)-([0-9]+)\)").expect("Invalid pitch count regex")
});

/// Keys of a stat line, in the order the box-score tables use
pub const STAT_LINE_KEYS: [&str; 14] = [
    "AB", "H", "2B", "3B", "HR", "BB", "IBB", "SO", "HBP", "SF", "SH", "GDP", "RBI", "PA",
];

/// Counting stats of one or more plate appearances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(rename = "AB")]
    pub at_bats: f64,
    #[serde(rename = "H")]
    pub hits: f64,
    #[serde(rename = "2B")]
    pub doubles: f64,
    #[serde(rename = "3B")]
    pub triples: f64,
    #[serde(rename = "HR")]
    pub home_runs: f64,
    #[serde(rename = "BB")]
    pub walks: f64,
    #[serde(rename = "IBB")]
    pub intentional_walks: f64,
    #[serde(rename = "SO")]
    pub strikeouts: f64,
    #[serde(rename = "HBP")]
    pub hit_by_pitch: f64,
    #[serde(rename = "SF")]
    pub sacrifice_flies: f64,
    #[serde(rename = "SH")]
    pub sacrifice_hits: f64,
    #[serde(rename = "GDP")]
    pub grounded_into_double_plays: f64,
    #[serde(rename = "RBI")]
    pub runs_batted_in: f64,
    #[serde(rename = "PA")]
    pub plate_appearances: f64,
}

impl StatLine {
    /// Every category zero, including PA
    pub fn zero() -> Self {
        Self {
            at_bats: 0.0,
            hits: 0.0,
            doubles: 0.0,
            triples: 0.0,
            home_runs: 0.0,
            walks: 0.0,
            intentional_walks: 0.0,
            strikeouts: 0.0,
            hit_by_pitch: 0.0,
            sacrifice_flies: 0.0,
            sacrifice_hits: 0.0,
            grounded_into_double_plays: 0.0,
            runs_batted_in: 0.0,
            plate_appearances: 0.0,
        }
    }

    /// Value of a category by its box-score key
    pub fn get(&self, key: &str) -> Option<f64> {
        let value = match key {
            "AB" => self.at_bats,
            "H" => self.hits,
            "2B" => self.doubles,
            "3B" => self.triples,
            "HR" => self.home_runs,
            "BB" => self.walks,
            "IBB" => self.intentional_walks,
            "SO" => self.strikeouts,
            "HBP" => self.hit_by_pitch,
            "SF" => self.sacrifice_flies,
            "SH" => self.sacrifice_hits,
            "GDP" => self.grounded_into_double_plays,
            "RBI" => self.runs_batted_in,
            "PA" => self.plate_appearances,
            _ => return None,
        };
        Some(value)
    }
}

/// A single plate appearance: PA is 1, everything else 0
impl Default for StatLine {
    fn default() -> Self {
        Self {
            plate_appearances: 1.0,
            ..Self::zero()
        }
    }
}

impl Add for StatLine {
    type Output = StatLine;

    fn add(mut self, other: StatLine) -> StatLine {
        self += other;
        self
    }
}

impl AddAssign for StatLine {
    fn add_assign(&mut self, other: StatLine) {
        self.at_bats += other.at_bats;
        self.hits += other.hits;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.home_runs += other.home_runs;
        self.walks += other.walks;
        self.intentional_walks += other.intentional_walks;
        self.strikeouts += other.strikeouts;
        self.hit_by_pitch += other.hit_by_pitch;
        self.sacrifice_flies += other.sacrifice_flies;
        self.sacrifice_hits += other.sacrifice_hits;
        self.grounded_into_double_plays += other.grounded_into_double_plays;
        self.runs_batted_in += other.runs_batted_in;
        self.plate_appearances += other.plate_appearances;
    }
}

impl Sum for StatLine {
    fn sum<I: Iterator<Item = StatLine>>(iter: I) -> StatLine {
        iter.fold(StatLine::zero(), Add::add)
    }
}

impl<'a> Sum<&'a StatLine> for StatLine {
    fn sum<I: Iterator<Item = &'a StatLine>>(iter: I) -> StatLine {
        iter.copied().sum()
    }
}

/// Occupied bases before the play
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseState {
    pub first: bool,
    pub second: bool,
    pub third: bool,
}

impl BaseState {
    pub fn is_empty(&self) -> bool {
        !(self.first || self.second || self.third)
    }
}

/// Pitches seen and the final count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchCount {
    pub pitches: u32,
    pub balls: u32,
    pub strikes: u32,
}

/// Game situation around a play, as far as the source reports it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayContext {
    pub hitter_team: Option<String>,
    pub pitcher_team: Option<String>,
    pub date: Option<NaiveDate>,
    pub sequence: Option<u32>,
    pub score: Option<String>,
    pub inning: Option<String>,
    pub outs: Option<u8>,
    pub runners: BaseState,
    pub count: Option<PitchCount>,
}

/// One interpreted plate appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateAppearanceOutcome {
    pub description: String,
    pub stats: StatLine,
    /// RBI credited on a play where the batter reached on an error
    pub suspicious_error_play: bool,
    pub context: PlayContext,
}

impl PlateAppearanceOutcome {
    pub fn with_context(mut self, context: PlayContext) -> Self {
        self.context = context;
        self
    }
}

/// Primary event of the ordered classification chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayEvent {
    Double,
    Triple,
    HomeRun,
    Strikeout,
    IntentionalWalk,
    Walk,
    HitByPitch,
    GroundIntoDoublePlay,
    SacrificeFly,
    SacrificeBunt,
}

impl PlayEvent {
    /// Walks, hit-by-pitch and sacrifices are not at-bats
    pub fn is_at_bat(&self) -> bool {
        !matches!(
            self,
            PlayEvent::IntentionalWalk
                | PlayEvent::Walk
                | PlayEvent::HitByPitch
                | PlayEvent::SacrificeFly
                | PlayEvent::SacrificeBunt
        )
    }
}

pub fn is_double(description: &str) -> bool {
    description.contains("Double") && !description.contains("Double Play")
}

pub fn is_triple(description: &str) -> bool {
    description.contains("Triple") && !description.contains("Triple Play")
}

pub fn is_home_run(description: &str) -> bool {
    description.contains("Home Run") || description.contains("Homer")
}

pub fn is_ground_into_double_play(description: &str) -> bool {
    description.contains("Ground Ball Double Play") || description.contains("Grounded into Double Play")
}

pub fn is_hit(description: &str) -> bool {
    description.contains("Single")
        || is_double(description)
        || is_triple(description)
        || is_home_run(description)
}

/// First matching event of the ordered chain, `None` for plain outs and singles
pub fn classify(description: &str) -> Option<PlayEvent> {
    if is_double(description) {
        Some(PlayEvent::Double)
    } else if is_triple(description) {
        Some(PlayEvent::Triple)
    } else if is_home_run(description) {
        Some(PlayEvent::HomeRun)
    } else if description.contains("Strikeout") {
        Some(PlayEvent::Strikeout)
    } else if description.contains("Intentional Walk") {
        Some(PlayEvent::IntentionalWalk)
    } else if description.contains("Walk") {
        Some(PlayEvent::Walk)
    } else if description.contains("Hit By Pitch") {
        Some(PlayEvent::HitByPitch)
    } else if is_ground_into_double_play(description) {
        Some(PlayEvent::GroundIntoDoublePlay)
    } else if description.contains("Sacrifice Fly") {
        Some(PlayEvent::SacrificeFly)
    } else if description.contains("Bunt Groundout") && description.contains("Sacrifice") {
        Some(PlayEvent::SacrificeBunt)
    } else {
        None
    }
}

/// RBI credited to the batter and whether the play needs manual review
pub fn count_rbis(description: &str, hitter_surname: &str) -> (i64, bool) {
    let mut rbis = description.matches("Scores").count() as i64;
    rbis -= description.matches("No RBI").count() as i64;

    // * A home run drives in the batter unless the text already lists them scoring
    if is_home_run(description) && !description.contains(&format!("{hitter_surname} Scores")) {
        rbis += 1;
    }

    let mut suspicious = false;
    if rbis > 0 && PATTERN_ERROR_REACH.is_match(description) {
        suspicious = true;
    }

    if is_ground_into_double_play(description) {
        rbis = 0;
    }

    (rbis.max(0), suspicious)
}

/// Interprets one plate-appearance description for the batter `hitter_surname`
pub fn interpret(description: &str, hitter_surname: &str) -> PlateAppearanceOutcome {
    let mut stats = StatLine::default();

    if is_hit(description) {
        stats.hits = 1.0;
    }

    let event = classify(description);
    match event {
        Some(PlayEvent::Double) => stats.doubles = 1.0,
        Some(PlayEvent::Triple) => stats.triples = 1.0,
        Some(PlayEvent::HomeRun) => stats.home_runs = 1.0,
        Some(PlayEvent::Strikeout) => stats.strikeouts = 1.0,
        Some(PlayEvent::IntentionalWalk) => {
            stats.walks = 1.0;
            stats.intentional_walks = 1.0;
        }
        Some(PlayEvent::Walk) => stats.walks = 1.0,
        Some(PlayEvent::HitByPitch) => stats.hit_by_pitch = 1.0,
        Some(PlayEvent::GroundIntoDoublePlay) => stats.grounded_into_double_plays = 1.0,
        Some(PlayEvent::SacrificeFly) => stats.sacrifice_flies = 1.0,
        Some(PlayEvent::SacrificeBunt) => stats.sacrifice_hits = 1.0,
        None => {}
    }

    let (rbis, suspicious_error_play) = count_rbis(description, hitter_surname);
    stats.runs_batted_in = rbis as f64;

    if suspicious_error_play {
        warn!(
            description = %description,
            rbis = rbis,
            "RBI credited on an error play, flagged for review"
        );
        telemetry::record_suspicious_play();
    }

    let is_at_bat = event.map_or(true, |e| e.is_at_bat());
    stats.at_bats = if is_at_bat { 1.0 } else { 0.0 };

    PlateAppearanceOutcome {
        description: description.to_string(),
        stats,
        suspicious_error_play,
        context: PlayContext::default(),
    }
}

/// Reads a runners-on cell such as "1-3" or "-2-"
pub fn parse_runners(text: &str) -> BaseState {
    BaseState {
        first: text.contains('1'),
        second: text.contains('2'),
        third: text.contains('3'),
    }
}

/// Reads "5 (2-2)" as five pitches, two balls, two strikes
pub fn parse_pitch_count(text: &str) -> Option<PitchCount> {
    let caps = PATTERN_PITCH_COUNT.captures(text.trim())?;
    Some(PitchCount {
        pitches: caps.get(1)?.as_str().parse().ok()?,
        balls: caps.get(2)?.as_str().parse().ok()?,
        strikes: caps.get(3)?.as_str().parse().ok()?,
    })
}

/// Reads "2006-05-03" or a double-header date like "2006-05-03 (2)"
pub fn parse_play_date(text: &str) -> Option<NaiveDate> {
    let date_text = text.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_text, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_play_is_not_a_double() {
        let outcome = interpret("Grounded into Double Play: SS-2B-1B", "Ortiz");
        assert_eq!(outcome.stats.doubles, 0.0);
        assert_eq!(outcome.stats.hits, 0.0);
        assert_eq!(outcome.stats.grounded_into_double_plays, 1.0);
        assert_eq!(outcome.stats.at_bats, 1.0);
    }

    #[test]
    fn test_triple_play_is_not_a_triple() {
        assert!(!is_triple("Lineout into Triple Play"));
        assert!(is_triple("Triple to RF (Line Drive)"));
    }

    #[test]
    fn test_single_is_hit_without_event() {
        let outcome = interpret("Single to CF (Ground Ball)", "Ortiz");
        assert_eq!(outcome.stats.hits, 1.0);
        assert_eq!(outcome.stats.at_bats, 1.0);
        assert_eq!(classify("Single to CF (Ground Ball)"), None);
    }

    #[test]
    fn test_sacrifice_bunt_needs_both_markers() {
        assert_eq!(
            classify("Sacrifice Bunt Groundout: P-1B; Pedroia to 2B"),
            Some(PlayEvent::SacrificeBunt)
        );
        assert_eq!(classify("Bunt Groundout: C-1B"), None);
    }

    #[test]
    fn test_gdp_clears_rbi() {
        let (rbis, _) = count_rbis("Ground Ball Double Play: 2B-SS-1B; Ramirez Scores", "Ortiz");
        assert_eq!(rbis, 0);
    }

    #[test]
    fn test_stat_line_sum() {
        let lines = vec![
            interpret("Single to LF", "Ortiz").stats,
            interpret("Walk", "Ortiz").stats,
            interpret("Ortiz Homers", "Ortiz").stats,
        ];
        let total: StatLine = lines.iter().sum();
        assert_eq!(total.plate_appearances, 3.0);
        assert_eq!(total.at_bats, 2.0);
        assert_eq!(total.hits, 2.0);
        assert_eq!(total.get("RBI"), Some(1.0));
        assert_eq!(total.get("XYZ"), None);
    }

    #[test]
    fn test_context_parsers() {
        let runners = parse_runners("1-3");
        assert!(runners.first && !runners.second && runners.third);
        assert!(parse_runners("---").is_empty());

        let count = parse_pitch_count("5 (2-2)").unwrap();
        assert_eq!((count.pitches, count.balls, count.strikes), (5, 2, 2));
        assert!(parse_pitch_count("").is_none());

        assert_eq!(
            parse_play_date("2006-05-03 (2)"),
            NaiveDate::from_ymd_opt(2006, 5, 3)
        );
    }

    #[test]
    fn test_stat_line_serializes_box_score_keys() {
        let json = serde_json::to_value(StatLine::default()).unwrap();
        assert_eq!(json["PA"], 1.0);
        assert_eq!(json["2B"], 0.0);
    }
}
