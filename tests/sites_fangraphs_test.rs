mod common;

use common::ScriptedSession;
use stat_miner::config::MinerConfig;
use stat_miner::engine::BrowserError;
use stat_miner::error::MinerError;
use stat_miner::network::FastClient;
use stat_miner::refinery::CellValue;
use stat_miner::sites::{FanGraphs, FanGraphsId};
use std::sync::Arc;

const SPLITS_PAGE: &str = r#"
<div id="standard"><table><tbody>
  <tr class="row-mlb-season"><td data-stat="Season">2022</td><td data-stat="PA">112</td><td data-stat="wSL">3.4</td></tr>
  <tr class="row-mlb-season"><td data-stat="Season">2023</td><td data-stat="PA">98</td><td data-stat="wSL"></td></tr>
  <tr class="row-mlb-total"><td data-stat="Season">Total</td><td data-stat="PA">210</td></tr>
</tbody></table></div>"#;

fn betts() -> FanGraphsId {
    FanGraphsId {
        player_path: "mookie-betts/13611".to_string(),
        position: "OF".to_string(),
    }
}

fn fangraphs(session: ScriptedSession) -> FanGraphs<ScriptedSession> {
    let client = Arc::new(FastClient::new(&MinerConfig::default()).unwrap());
    FanGraphs::new(client, session)
}

#[tokio::test]
async fn test_splits_read_after_table_renders() {
    let fangraphs = fangraphs(ScriptedSession::serving(SPLITS_PAGE).without(".loneoak-CloseButton"));

    let season = fangraphs.pitch_type_season(&betts(), "SL", 2023).await.unwrap();
    assert_eq!(season.get_i64("PA"), Some(98));
    assert_eq!(season.get("wSL"), Some(&CellValue::Blank));

    assert_eq!(
        fangraphs.session().calls(),
        vec![
            "navigate https://www.fangraphs.com/players/mookie-betts/13611/pitch-type-splits?position=OF&data=pi&pitchtype=SL",
            "wait .loneoak-CloseButton",
            "wait #standard",
        ]
    );
}

#[tokio::test]
async fn test_promo_modal_closed_when_shown() {
    let fangraphs = fangraphs(ScriptedSession::serving(SPLITS_PAGE));

    fangraphs.pitch_type_season(&betts(), "CH", 2022).await.unwrap();
    let calls = fangraphs.session().calls();
    assert_eq!(calls[1], "wait .loneoak-CloseButton");
    assert_eq!(calls[2], "click .loneoak-CloseButton");
    assert_eq!(calls[3], "wait #standard");
}

#[tokio::test]
async fn test_table_never_rendering_is_a_timeout() {
    let session = ScriptedSession::serving("<p>Loading</p>")
        .without(".loneoak-CloseButton")
        .without("#standard");
    let result = fangraphs(session).pitch_type_season(&betts(), "SL", 2023).await;
    assert!(matches!(result, Err(MinerError::Browser(BrowserError::Timeout(_)))));
}

#[tokio::test]
async fn test_unknown_pitch_type_rejected_before_navigating() {
    let fangraphs = fangraphs(ScriptedSession::serving(SPLITS_PAGE));
    let result = fangraphs.pitch_type_season(&betts(), "XX", 2023).await;
    assert!(matches!(result, Err(MinerError::Parse(_))));
    assert!(fangraphs.session().calls().is_empty());
}
