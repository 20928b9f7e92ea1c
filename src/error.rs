use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the viewer can report. None of them are fatal: the UI shows
/// the message and stays interactive.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewerError {
    /// The URL has no `spreadsheets/d/<id>` segment; nothing was fetched.
    #[error("Invalid Google Sheet URL: {0}")]
    InvalidSourceReference(String),

    /// Network or CSV parse failure while loading.
    #[error("Error loading data: {0}")]
    LoadFailure(String),

    /// The load succeeded but produced no rows or no columns.
    #[error("No data found in the sheet")]
    EmptyResult,

    /// A single column's filter could not be built.
    #[error("Cannot create filter for '{column}': {reason}")]
    FilterConstruction { column: String, reason: String },

    #[error("Export failed: {0}")]
    ExportFailure(String),

    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, ViewerError>;
