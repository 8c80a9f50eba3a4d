use stat_miner::refinery::{
    list_identities, resolve_id, scan_roster, CellLocator, ExtractionError, RosterLayout,
    RowOutcome, SkipReason, StatDocument,
};

fn roster() -> StatDocument {
    StatDocument::parse(
        r#"
        <table id="players_standard_batting">
            <thead><tr><th>Rk</th><th>Name</th><th>Age</th><th>Tm</th></tr></thead>
            <tbody>
                <tr class="thead"><th>Rk</th><td>Name</td><td>Age</td><td>Tm</td></tr>
                <tr><th>1</th><td><a href="/players/o/ortizda01.shtml">David&nbsp;Ortiz</a></td><td>37</td><td>BOS</td></tr>
            </tbody>
        </table>
        "#,
    )
}

fn layout() -> RosterLayout {
    RosterLayout::new(
        "players_standard_batting",
        CellLocator::Index(0),
        CellLocator::Index(2),
    )
}

#[test]
fn test_resolve_by_name_and_team() {
    assert_eq!(
        resolve_id(&roster(), &layout(), "David Ortiz", "BOS"),
        Ok("ortizda01".to_string())
    );
}

#[test]
fn test_wrong_team_is_not_found() {
    assert_eq!(
        resolve_id(&roster(), &layout(), "David Ortiz", "NYY"),
        Err(ExtractionError::PlayerNameNotFound("David Ortiz".to_string()))
    );
}

#[test]
fn test_missing_roster_is_not_found() {
    let doc = StatDocument::parse("<p>Rate limited</p>");
    assert!(matches!(
        resolve_id(&doc, &layout(), "David Ortiz", "BOS"),
        Err(ExtractionError::PlayerNameNotFound(_))
    ));
    assert!(list_identities(&doc, &layout()).is_empty());
}

#[test]
fn test_bulk_scan_reports_skipped_rows() {
    let outcomes = scan_roster(&roster(), &layout());
    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0],
        RowOutcome::Skipped {
            row: 0,
            reason: SkipReason::Divider
        }
    );

    let identities = list_identities(&roster(), &layout());
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].name, "David Ortiz");
    assert_eq!(identities[0].id, "ortizda01");
    assert_eq!(identities[0].team, "BOS");
}
