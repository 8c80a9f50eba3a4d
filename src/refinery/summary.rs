// * Summary (footer) row extraction for lifetime totals.
// * The footer row is found by a marker cell, not by matching a column value.

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::document::{attr, cell_text, parent_element, StatDocument};
use super::errors::ExtractionError;
use super::tables::{header_labels, row_cells, CellValue, StatRecord};
use crate::config::constants::{
    SUMMARY_MARKER_ATTRIBUTE, SUMMARY_MARKER_VALUE, SUMMARY_TRAILING_COLUMNS,
};

static SELECTOR_TFOOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tfoot").expect("Invalid tfoot selector"));
static SELECTOR_FOOTER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("Invalid footer cell selector"));

/// Identifies the footer cell that starts the summary row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryMarker {
    pub attribute: String,
    pub value: String,
    /// Non-statistical columns at the end of the header row
    pub trailing_columns: usize,
}

impl SummaryMarker {
    pub fn new(attribute: &str, value: &str, trailing_columns: usize) -> Self {
        Self {
            attribute: attribute.to_string(),
            value: value.to_string(),
            trailing_columns,
        }
    }
}

impl Default for SummaryMarker {
    fn default() -> Self {
        Self::new(
            SUMMARY_MARKER_ATTRIBUTE,
            SUMMARY_MARKER_VALUE,
            SUMMARY_TRAILING_COLUMNS,
        )
    }
}

/// Extracts the summary row of `table_id`.
///
/// A missing marker cell means the player has no totals row, which reads as
/// zero in every category: the result is `StatRecord::zeroed(fallback_keys)`.
/// A missing table or footer section is a `TableNotFound` error.
pub fn extract_summary_row<S: AsRef<str>>(
    doc: &StatDocument,
    table_id: &str,
    marker: &SummaryMarker,
    fallback_keys: &[S],
) -> Result<StatRecord, ExtractionError> {
    let table = doc
        .find_table(table_id)
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;
    let footer = table
        .select(&SELECTOR_TFOOT)
        .next()
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;

    let Some(marker_cell) = find_marker_cell(&footer, marker) else {
        debug!(table_id = %table_id, "No summary marker, using zeroed record");
        return Ok(StatRecord::zeroed(fallback_keys.iter().map(|key| key.as_ref())));
    };

    let headers = header_labels(&table)
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;

    // * The marker spans the leading non-statistical columns
    let leading = attr(&marker_cell, "colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let end = headers.len().saturating_sub(marker.trailing_columns);
    let labels = headers.get(leading..end).unwrap_or_default();

    let row = parent_element(&marker_cell)
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;
    let values: Vec<ElementRef<'_>> = row_cells(&row)
        .into_iter()
        .skip_while(|cell| cell.id() != marker_cell.id())
        .skip(1)
        .collect();

    let mut record = StatRecord::new();
    for (i, label) in labels.iter().enumerate() {
        let value = values
            .get(i)
            .map(|cell| CellValue::from_text(&cell_text(cell)))
            .unwrap_or(CellValue::Blank);
        record.insert(label.clone(), value);
    }

    Ok(record)
}

fn find_marker_cell<'a>(footer: &ElementRef<'a>, marker: &SummaryMarker) -> Option<ElementRef<'a>> {
    footer
        .select(&SELECTOR_FOOTER_CELL)
        .find(|cell| cell.value().attr(&marker.attribute) == Some(marker.value.as_str()))
}
