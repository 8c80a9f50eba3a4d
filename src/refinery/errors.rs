use thiserror::Error;

// * Structural failures of the extraction core. Each variant carries the label that failed to resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Row '{row}' not found in column '{column}' of table '{table}'")]
    TableRowNotFound {
        row: String,
        column: String,
        table: String,
    },

    #[error("Player not found: {0}")]
    PlayerNameNotFound(String),
}

impl ExtractionError {
    pub fn table_row_not_found(row: &str, column: &str, table: &str) -> Self {
        Self::TableRowNotFound {
            row: row.to_string(),
            column: column.to_string(),
            table: table.to_string(),
        }
    }
}
