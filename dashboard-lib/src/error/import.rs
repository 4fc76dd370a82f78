//! CSV import error types

/// Reasons a CSV upload is rejected.
///
/// Line numbers are 1-based and count every physical line, blank ones included.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// The file has no header line.
    #[error("CSV file is empty")]
    Empty,

    /// The file has a header but no data rows.
    #[error("CSV file has no data rows")]
    NoRows,

    /// Quoted fields are not supported by the comma splitter.
    #[error("Line {line}: quoted fields are not supported")]
    Quoted { line: usize },

    /// A header cell names no column of the entity.
    #[error("Unknown column '{column}' in header")]
    UnknownColumn { column: String },

    /// A column appears twice in the header.
    #[error("Duplicate column '{column}' in header")]
    DuplicateColumn { column: String },

    /// A row has a different number of cells than the header.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}
