use stat_miner::engine::urls::{build_url, host_of, normalize_url};

// * URL normalization and construction

#[test]
fn test_relative_link_joined_to_base() {
    let base = "https://www.baseball-reference.com/leagues/MLB/2016-standard-batting.shtml";
    assert_eq!(
        normalize_url("/players/o/ortizda01.shtml", base).unwrap(),
        "https://www.baseball-reference.com/players/o/ortizda01.shtml"
    );
}

#[test]
fn test_strip_fragment() {
    let base = "https://www.baseball-reference.com";
    assert_eq!(
        normalize_url("/players/split.fcgi#plato", base).unwrap(),
        "https://www.baseball-reference.com/players/split.fcgi"
    );
}

#[test]
fn test_lowercase_host() {
    assert_eq!(
        normalize_url("/baseball/", "https://STATHEAD.com").unwrap(),
        "https://stathead.com/baseball/"
    );
}

#[test]
fn test_tracking_param_removal() {
    let href = "/baseball/batter_vs_pitcher.cgi?batter=ortizda01&utm_medium=br&utm_source=player-finder-links&utm_campaign=baseball";
    let normalized = normalize_url(href, "https://stathead.com").unwrap();
    assert_eq!(
        normalized,
        "https://stathead.com/baseball/batter_vs_pitcher.cgi?batter=ortizda01"
    );
}

#[test]
fn test_query_sorting() {
    let normalized = normalize_url("/players/split.fcgi?year=Career&t=b&id=ortizda01", "https://www.baseball-reference.com").unwrap();
    assert_eq!(
        normalized,
        "https://www.baseball-reference.com/players/split.fcgi?id=ortizda01&t=b&year=Career"
    );
}

#[test]
fn test_invalid_base() {
    assert_eq!(normalize_url("page", "not_a_url"), None);
    assert_eq!(build_url("not_a_url", "/page", &[]), None);
}

#[test]
fn test_build_url_encodes_values() {
    let url = build_url("https://stathead.com", "/baseball/versus-finder.cgi", &[("player_id1", "o'neipa01")]).unwrap();
    assert_eq!(host_of(&url), Some("stathead.com".to_string()));
    assert!(url.contains("player_id1=o%27neipa01"));
}
