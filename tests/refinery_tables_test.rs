use stat_miner::refinery::{
    extract_table, extract_table_with, select_body_row, select_row, CellValue, ExtractionError,
    RowLayout, StatDocument, StatRecord,
};

// * Table extraction and row selection over hand-written pages

fn season_page() -> StatDocument {
    StatDocument::parse(
        r#"
        <table id="t">
            <thead><tr><th>Rk</th><th>Year</th><th>Team</th><th>G</th><th>AB</th></tr></thead>
            <tbody>
                <tr><th>1</th><td>2013</td><td>BOS</td><td>137</td><td>518</td></tr>
            </tbody>
        </table>
        "#,
    )
}

#[test]
fn test_select_row_drops_rank_column() {
    let record = select_row(&season_page(), "t", "2013", "Year").unwrap();

    let expected: StatRecord = vec![
        ("Year", "2013"),
        ("Team", "BOS"),
        ("G", "137"),
        ("AB", "518"),
    ]
    .into_iter()
    .collect();
    assert_eq!(record, expected);
}

#[test]
fn test_extraction_is_idempotent() {
    let doc = season_page();
    let first = extract_table(&doc, "t").unwrap();
    let second = extract_table(&doc, "t").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_row_label_must_match_exactly() {
    let doc = season_page();
    assert!(matches!(
        select_row(&doc, "t", "201", "Year"),
        Err(ExtractionError::TableRowNotFound { .. })
    ));
    assert!(matches!(
        select_row(&doc, "t", "bos", "Team"),
        Err(ExtractionError::TableRowNotFound { .. })
    ));
}

#[test]
fn test_ragged_and_divider_rows_are_excluded() {
    let doc = StatDocument::parse(
        r#"
        <table id="splits">
            <thead><tr><th>Rk</th><th>Split</th><th>PA</th><th>HR</th></tr></thead>
            <tbody>
                <tr><th>1</th><td>vs RHP</td><td>6120</td><td>380</td></tr>
                <tr class="spacer"><td colspan="4">Platoon Splits</td></tr>
                <tr><th>2</th><td>vs LHP</td><td>3971</td></tr>
            </tbody>
            <tfoot><tr><th></th><th>Career Totals</th><td>10091</td><td>541</td></tr></tfoot>
        </table>
        "#,
    );

    let table = extract_table(&doc, "splits").unwrap();
    assert_eq!(table.rejected_rows, 2);
    assert_eq!(table.records.len(), 2);
    for record in &table.records {
        assert_eq!(record.len(), table.headers.len() - 1);
    }
    assert!(select_row(&doc, "splits", "vs LHP", "Split").is_err());

    // * Footer labels in header cells are blank unless the full layout is used
    let career = select_body_row(&doc, "splits", "Career Totals", "Split").unwrap();
    assert_eq!(career.get_i64("PA"), Some(10091));
    assert_eq!(career.get("Rk"), Some(&CellValue::Blank));
}

#[test]
fn test_full_layout_keeps_every_header() {
    let table = extract_table_with(&season_page(), "t", RowLayout::Full).unwrap();
    let record = &table.records[0];
    assert_eq!(record.get_text("Rk"), Some("1"));
    assert_eq!(record.len(), table.headers.len());
}

#[test]
fn test_tables_hidden_in_comments() {
    let markup = r#"
        <div id="all_total"><!--
            <table id="total">
                <thead><tr><th>Split</th><th>HR</th></tr></thead>
                <tbody><tr><th>Career Totals</th><td>541</td></tr></tbody>
            </table>
        --></div>"#;

    assert!(extract_table(&StatDocument::parse(markup), "total").is_err());

    let doc = StatDocument::parse_with_comments(markup);
    let career = select_body_row(&doc, "total", "Career Totals", "Split").unwrap();
    assert_eq!(career.get_i64("HR"), Some(541));
}
