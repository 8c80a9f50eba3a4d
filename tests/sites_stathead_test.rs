mod common;

use common::ScriptedSession;
use stat_miner::engine::BrowserError;
use stat_miner::error::MinerError;
use stat_miner::refinery::{CellValue, ExtractionError, StatDocument};
use stat_miner::sites::stathead::{
    parse_game_logs, parse_play_log, season_identifiers, HOME_COLUMN, REGULAR_SEASON_PLAY_TABLE,
};
use stat_miner::sites::{Credentials, Stathead};

const PLAY_LOG: &str = r#"
<div id="all_stats_bvp_pa_rs"><!--
<table id="stats_bvp_pa_rs"><tbody>
  <tr><th>1</th><td data-stat="date">2006-05-03</td><td data-stat="event_b_team">BOS</td>
      <td data-stat="event_p_team">NYY</td><td data-stat="inning">b8</td>
      <td data-stat="team_rel_score">2-3</td><td data-stat="outs">1</td>
      <td data-stat="runners_on_bases">1-3</td><td data-stat="pitches_pbp">5 (2-2)</td>
      <td data-stat="play_desc">Single to CF (Ground Ball); Youkilis Scores</td></tr>
  <tr class="thead"><th>Rk</th><td data-stat="play_desc">Play</td></tr>
  <tr><th>2</th><td data-stat="date"></td><td data-stat="event_b_team"></td>
      <td data-stat="event_p_team"></td><td data-stat="inning">b9</td>
      <td data-stat="team_rel_score">3-3</td><td data-stat="outs">2</td>
      <td data-stat="runners_on_bases">---</td><td data-stat="pitches_pbp">1 (0-0)</td>
      <td data-stat="play_desc">Home Run (Fly Ball to Deep RF Line)</td></tr>
</tbody></table>
--></div>"#;

#[test]
fn test_play_log_carries_team_and_date_forward() {
    let doc = StatDocument::parse_with_comments(PLAY_LOG);
    let plays = parse_play_log(&doc, REGULAR_SEASON_PLAY_TABLE, "Ortiz").unwrap();

    assert_eq!(plays.len(), 2);

    let single = &plays[0];
    assert_eq!(single.stats.hits, 1.0);
    assert_eq!(single.stats.runs_batted_in, 1.0);
    assert_eq!(single.context.sequence, Some(1));
    assert_eq!(single.context.hitter_team.as_deref(), Some("BOS"));
    assert_eq!(single.context.outs, Some(1));
    assert!(single.context.runners.first);
    assert!(!single.context.runners.second);
    assert!(single.context.runners.third);
    let count = single.context.count.unwrap();
    assert_eq!((count.pitches, count.balls, count.strikes), (5, 2, 2));

    let homer = &plays[1];
    assert_eq!(homer.stats.home_runs, 1.0);
    assert_eq!(homer.stats.runs_batted_in, 1.0);
    assert_eq!(homer.context.sequence, Some(2));
    assert_eq!(homer.context.hitter_team.as_deref(), Some("BOS"));
    assert_eq!(homer.context.pitcher_team.as_deref(), Some("NYY"));
    assert_eq!(homer.context.date, single.context.date);
    assert!(homer.context.date.is_some());
    assert!(homer.context.runners.is_empty());
}

#[test]
fn test_season_identifiers_skip_malformed_rows() {
    let doc = StatDocument::parse(
        r#"<table id="stats"><tbody>
            <tr><td data-stat="name_display"><a href="/players/o/ortizda01.shtml">David Ortiz</a></td>
                <td data-stat="teams_played_for">BOS</td><td data-stat="b_pa">1,602</td></tr>
            <tr class="thead"><td data-stat="name_display">Player</td></tr>
            <tr><td data-stat="name_display">No Link</td>
                <td data-stat="teams_played_for">NYY</td><td data-stat="b_pa">12</td></tr>
            <tr><td data-stat="name_display"><a href="/players/r/ramirma02.shtml">Manny Ramirez</a></td>
                <td data-stat="teams_played_for">BOS,LAD</td><td data-stat="b_pa">658</td></tr>
           </tbody></table>"#,
    );

    let entries = season_identifiers(&doc, "b_pa");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].identity.id, "ortizda01");
    assert_eq!(entries[0].identity.name, "David Ortiz");
    assert_eq!(entries[0].count, 1602);
    assert_eq!(entries[1].identity.id, "ramirma02");
    assert_eq!(entries[1].identity.team, "BOS");
}

#[tokio::test]
async fn test_login_fills_form_in_order() {
    let stathead = Stathead::new(ScriptedSession::default());
    stathead
        .login(&Credentials::new("miner", "hunter2"))
        .await
        .unwrap();

    assert_eq!(
        stathead.session().calls(),
        vec![
            "navigate https://stathead.com/users/login.cgi",
            "wait #username",
            "type #username miner",
            "wait #password",
            "type #password hunter2",
            "wait #sh-login-button",
            "click #sh-login-button",
        ]
    );
}

#[tokio::test]
async fn test_login_stops_when_form_missing() {
    let stathead = Stathead::new(ScriptedSession::default().without("#password"));

    let result = stathead.login(&Credentials::new("miner", "hunter2")).await;
    assert!(matches!(result, Err(MinerError::Browser(BrowserError::Timeout(_)))));
    assert!(!stathead
        .session()
        .calls()
        .iter()
        .any(|call| call.starts_with("click")));
}

#[tokio::test]
async fn test_play_log_without_postseason_table() {
    let stathead = Stathead::new(ScriptedSession::serving(PLAY_LOG));
    let plays = stathead.play_log("ortizda01", "Ortiz", "riverma01").await.unwrap();

    assert_eq!(plays.len(), 2);
    let calls = stathead.session().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("navigate https://stathead.com/"));
    assert!(calls[0].contains("ortizda01"));
}

const GAME_FINDER: &str = r#"
<table id="stats">
  <thead><tr><th>Rk</th><th>Player</th><th>Date</th><th>Team</th><th></th><th>Opp</th><th>AB</th><th>HR</th><th>BA</th></tr></thead>
  <tbody>
    <tr><th>1</th><td><a href="/players/o/ortizda01.shtml">David Ortiz</a></td><td>2016-04-05</td>
        <td>BOS</td><td>@</td><td>CLE</td><td>4</td><td>1</td><td>.250</td></tr>
    <tr class="thead"><th>Rk</th><th>Player</th><th>Date</th><th>Team</th><th></th><th>Opp</th><th>AB</th><th>HR</th><th>BA</th></tr>
    <tr><th>2</th><td><a href="/players/o/ortizda01.shtml">David Ortiz</a></td><td>2016-04-12</td>
        <td>BOS</td><td></td><td>BAL</td><td>3</td><td></td><td>.286</td></tr>
    <tr><th>3</th><td>Partial row</td></tr>
  </tbody>
</table>"#;

#[test]
fn test_game_logs_align_cells_to_header() {
    let games = parse_game_logs(&StatDocument::parse(GAME_FINDER)).unwrap();
    assert_eq!(games.len(), 2);

    let road = &games[0];
    assert!(!road.is_home);
    assert_eq!(road.player_id.as_deref(), Some("ortizda01"));
    assert_eq!(road.stats.get_i64("Rk"), Some(1));
    assert_eq!(road.stats.get("Opp"), Some(&CellValue::Text("CLE".to_string())));
    assert_eq!(road.stats.get_i64("HR"), Some(1));

    let home = &games[1];
    assert!(home.is_home);
    assert_eq!(home.stats.get(HOME_COLUMN), Some(&CellValue::Blank));
    assert_eq!(home.stats.get("HR"), Some(&CellValue::Blank));
    assert_eq!(home.stats.get_i64("AB"), Some(3));
}

#[test]
fn test_game_logs_without_results_table() {
    assert_eq!(
        parse_game_logs(&StatDocument::parse("<p>No games found</p>")),
        Err(ExtractionError::TableNotFound("stats".to_string()))
    );
}

#[tokio::test]
async fn test_season_pitching_game_logs_read_through_session() {
    let stathead = Stathead::new(ScriptedSession::serving(GAME_FINDER));
    let games = stathead.season_pitching_game_logs("salech01", 2016).await.unwrap();

    assert_eq!(games.len(), 2);
    assert_eq!(
        stathead.session().calls(),
        vec![
            "navigate https://stathead.com/baseball/player-pitching-game-finder.cgi?request=1&player_id=salech01&timeframe=seasons&year_min=2016&year_max=2016"
        ]
    );
}
