// * Record table extraction and row selection.
// * Header cells are aligned to row cells by position, never by name.

use scraper::{ElementRef, Selector};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use super::document::{cell_text, child_elements, StatDocument};
use super::errors::ExtractionError;
use crate::ops::telemetry;

// * Precompiled CSS selectors
static SELECTOR_THEAD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("thead").expect("Invalid thead selector"));
static SELECTOR_TH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("Invalid th selector"));
static SELECTOR_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Invalid tr selector"));

/// One cell of a stat record.
///
/// `Blank` marks a cell that rendered no text (or, in the rank-column layout,
/// a header-style cell). It is not a statistical zero, but numeric accessors
/// read it as 0 and it serializes as the number `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CellValue {
    Text(String),
    #[default]
    Blank,
}

impl CellValue {
    /// Builds a value from rendered cell text, empty text becomes `Blank`
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(text.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            CellValue::Blank => None,
        }
    }

    /// Integer reading. Blank reads as 0, thousands separators are ignored
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Text(text) => text.replace(',', "").trim().parse().ok(),
            CellValue::Blank => Some(0),
        }
    }

    /// Float reading. Blank reads as 0.0, a leading-dot rate like ".312" parses
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Text(text) => text.replace(',', "").trim().parse().ok(),
            CellValue::Blank => Some(0.0),
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        CellValue::Text(text)
    }
}

impl PartialEq<str> for CellValue {
    fn eq(&self, other: &str) -> bool {
        matches!(self, CellValue::Text(text) if text == other)
    }
}

impl PartialEq<&str> for CellValue {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Blank => f.write_str("0"),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(text) => serializer.serialize_str(text),
            CellValue::Blank => serializer.serialize_u8(0),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawCell {
            Text(String),
            Number(i64),
        }

        Ok(match RawCell::deserialize(deserializer)? {
            RawCell::Text(text) => CellValue::Text(text),
            RawCell::Number(0) => CellValue::Blank,
            RawCell::Number(n) => CellValue::Text(n.to_string()),
        })
    }
}

/// Insertion-ordered mapping from column label to cell value.
///
/// Inserting an existing label replaces its value in place, so duplicate
/// header labels keep the position of their first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatRecord {
    entries: Vec<(String, CellValue)>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record with every key set to `Blank`
    pub fn zeroed<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut record = Self::new();
        for key in keys {
            record.insert(key, CellValue::Blank);
        }
        record
    }

    pub fn insert(&mut self, label: impl Into<String>, value: CellValue) {
        let label = label.into();
        match self.entries.iter_mut().find(|(key, _)| *key == label) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value)
    }

    pub fn get_text(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(CellValue::as_text)
    }

    pub fn get_i64(&self, label: &str) -> Option<i64> {
        self.get(label).and_then(CellValue::as_i64)
    }

    pub fn get_f64(&self, label: &str) -> Option<f64> {
        self.get(label).and_then(CellValue::as_f64)
    }

    pub fn contains_key(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every value is `Blank`
    pub fn is_all_blank(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_blank())
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for StatRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = StatRecord::new();
        for (key, value) in iter {
            record.insert(key, value.into());
        }
        record
    }
}

impl Serialize for StatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = StatRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column labels to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StatRecord, A::Error> {
                let mut record = StatRecord::new();
                while let Some((key, value)) = access.next_entry::<String, CellValue>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// How a kept row maps onto the header labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLayout {
    /// Column 0 (rank / row name) is dropped; header-style cells store `Blank`
    #[default]
    RankColumn,
    /// Every column is kept and header-style cells keep their text
    Full,
}

/// Header labels plus the records that survived the cell-count filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub table_id: String,
    pub headers: Vec<String>,
    pub records: Vec<StatRecord>,
    /// Rows dropped because their cell count differed from the header count
    pub rejected_rows: usize,
}

impl ExtractedTable {
    /// First record whose `column` value equals `row_label` exactly
    pub fn find_row(&self, row_label: &str, column: &str) -> Result<&StatRecord, ExtractionError> {
        for record in &self.records {
            match record.get(column) {
                Some(value) if value == row_label => return Ok(record),
                Some(_) => continue,
                None => {
                    return Err(ExtractionError::table_row_not_found(
                        row_label,
                        column,
                        &self.table_id,
                    ))
                }
            }
        }

        Err(ExtractionError::table_row_not_found(
            row_label,
            column,
            &self.table_id,
        ))
    }
}

/// Extracts a table with the default rank-column layout
pub fn extract_table(doc: &StatDocument, table_id: &str) -> Result<ExtractedTable, ExtractionError> {
    extract_table_with(doc, table_id, RowLayout::RankColumn)
}

/// Extracts a table, mapping kept rows according to `layout`
pub fn extract_table_with(
    doc: &StatDocument,
    table_id: &str,
    layout: RowLayout,
) -> Result<ExtractedTable, ExtractionError> {
    let table = doc
        .find_table(table_id)
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;

    let headers = header_labels(&table)
        .ok_or_else(|| ExtractionError::TableNotFound(table_id.to_string()))?;

    let mut records = Vec::new();
    let mut rejected_rows = 0;

    // * Every row is a candidate, aggregate rows are not always inside tbody
    for row in table.select(&SELECTOR_TR) {
        if inside_thead(&row, &table) {
            continue;
        }

        let cells = row_cells(&row);
        if cells.len() != headers.len() {
            rejected_rows += 1;
            continue;
        }

        records.push(build_record(&headers, &cells, layout));
    }

    debug!(
        table_id = %table_id,
        columns = headers.len(),
        records = records.len(),
        rejected = rejected_rows,
        "Table extracted"
    );
    telemetry::record_table_extracted();
    telemetry::record_rows_rejected(rejected_rows as u64);

    Ok(ExtractedTable {
        table_id: table_id.to_string(),
        headers,
        records,
        rejected_rows,
    })
}

/// Selects the record whose `column_label` value equals `row_label`, rank column dropped
pub fn select_row(
    doc: &StatDocument,
    table_id: &str,
    row_label: &str,
    column_label: &str,
) -> Result<StatRecord, ExtractionError> {
    let table = extract_table_with(doc, table_id, RowLayout::RankColumn)?;
    table.find_row(row_label, column_label).cloned()
}

/// Like `select_row` but keeps every column, for total rows rendered in header cells
pub fn select_body_row(
    doc: &StatDocument,
    table_id: &str,
    row_label: &str,
    column_label: &str,
) -> Result<StatRecord, ExtractionError> {
    let table = extract_table_with(doc, table_id, RowLayout::Full)?;
    table.find_row(row_label, column_label).cloned()
}

/// Header labels in document order, `None` when the table has no header section
pub fn header_labels(table: &ElementRef<'_>) -> Option<Vec<String>> {
    let thead = table.select(&SELECTOR_THEAD).next()?;
    Some(thead.select(&SELECTOR_TH).map(|th| cell_text(&th)).collect())
}

/// Direct `th`/`td` children of a row
pub(crate) fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    child_elements(row)
        .into_iter()
        .filter(|cell| matches!(cell.value().name(), "th" | "td"))
        .collect()
}

fn inside_thead(row: &ElementRef<'_>, table: &ElementRef<'_>) -> bool {
    for ancestor in row.ancestors() {
        if ancestor.id() == table.id() {
            return false;
        }
        if let Some(element) = ancestor.value().as_element() {
            if element.name() == "thead" {
                return true;
            }
        }
    }
    false
}

pub(crate) fn build_record(headers: &[String], cells: &[ElementRef<'_>], layout: RowLayout) -> StatRecord {
    let mut record = StatRecord::new();
    let start = match layout {
        RowLayout::RankColumn => 1,
        RowLayout::Full => 0,
    };

    for (label, cell) in headers.iter().zip(cells.iter()).skip(start) {
        let is_data_cell = cell.value().name() == "td";
        let value = if layout == RowLayout::RankColumn && !is_data_cell {
            CellValue::Blank
        } else {
            CellValue::from_text(&cell_text(cell))
        };
        record.insert(label.clone(), value);
    }

    record
}
