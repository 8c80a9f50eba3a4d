use stat_miner::config::constants::HITTER_RELEVANT_STAT_KEYS;
use stat_miner::refinery::{extract_summary_row, ExtractionError, StatDocument, SummaryMarker};

fn finder_page(footer: &str) -> StatDocument {
    StatDocument::parse(&format!(
        r#"
        <table id="stats">
            <thead><tr><th>Rk</th><th>Player</th><th>G</th><th>PA</th><th>HR</th><th>Pos</th></tr></thead>
            <tbody><tr><th>1</th><td>David Ortiz</td><td>2408</td><td>10091</td><td>541</td><td>*D3</td></tr></tbody>
            <tfoot>{footer}</tfoot>
        </table>
        "#
    ))
}

#[test]
fn test_marker_row_aligned_to_statistical_headers() {
    let doc = finder_page(
        r#"<tr><td data-stat="stats_summary_explain" colspan="2">Career</td><td>2408</td><td>10091</td><td>541</td><td></td></tr>"#,
    );
    let record = extract_summary_row(&doc, "stats", &SummaryMarker::default(), &["G", "PA", "HR"]).unwrap();

    assert_eq!(record.keys().collect::<Vec<_>>(), vec!["G", "PA", "HR"]);
    assert_eq!(record.get_i64("PA"), Some(10091));
    assert_eq!(record.get_i64("HR"), Some(541));
}

#[test]
fn test_missing_marker_reads_as_zero_everywhere() {
    let doc = finder_page("<tr><td>No career line</td></tr>");
    let record = extract_summary_row(
        &doc,
        "stats",
        &SummaryMarker::default(),
        &HITTER_RELEVANT_STAT_KEYS,
    )
    .unwrap();

    assert_eq!(record.len(), HITTER_RELEVANT_STAT_KEYS.len());
    for key in HITTER_RELEVANT_STAT_KEYS {
        assert_eq!(record.get_i64(key), Some(0), "{key}");
    }
}

#[test]
fn test_missing_footer_is_table_not_found() {
    let doc = StatDocument::parse(r#"<table id="stats"><thead><tr><th>G</th></tr></thead></table>"#);
    assert_eq!(
        extract_summary_row(&doc, "stats", &SummaryMarker::default(), &["G"]),
        Err(ExtractionError::TableNotFound("stats".to_string()))
    );
}
