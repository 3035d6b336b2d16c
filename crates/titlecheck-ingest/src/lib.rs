use thiserror::Error;

pub mod sheet;
pub mod validate;

// Re-export the intake API
pub use sheet::{parse_sheet, SheetRow};
pub use validate::{excluded_conference_names, validate_rows, RowViolation};

/// Declared MIME types accepted for upload. Anything else is rejected
/// before any parsing or network traffic.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

/// Whether a declared file type is an accepted spreadsheet type.
pub fn is_accepted_mime(mime: &str) -> bool {
    ACCEPTED_MIME_TYPES.contains(&mime)
}

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("failed to open workbook: {0}")]
    Open(String),
    #[error("workbook has no worksheet")]
    NoWorksheet,
    #[error("worksheet has no header row")]
    NoHeaderRow,
}
