use std::path::PathBuf;

use thiserror::Error;

pub mod aggregate;
mod cancel;
pub mod format;
pub mod gateway;
pub mod scheduler;
pub mod session;
pub mod upload;
pub mod view;

// Re-export for convenience
pub use aggregate::ExportOutcome;
pub use gateway::Gateway;
pub use scheduler::{FetchSpec, DEBOUNCE_WINDOW};
pub use session::{Session, UploadedFileData};
pub use titlecheck_api::{ApiError, ConferenceEntry, FileRecord, PageResult, UploadPayload};
pub use titlecheck_ingest::{RowViolation, SheetError};
pub use titlecheck_reporting::{ExportError, ExportRow};
pub use upload::{SpreadsheetFile, UploadOutcome};
pub use view::{ViewMode, ViewState};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("sheet error: {0}")]
    Sheet(#[from] SheetError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
}

/// Progress through a bulk export page walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    pub current: u32,
    pub total: u32,
}

/// Severity of a transient operator notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Events flowing from the session core to whatever surface renders it.
///
/// The core never blocks on the receiver; a dropped receiver just means
/// nobody is watching.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The visible table was replaced wholesale by a committed fetch.
    TableReplaced {
        records: usize,
        page: u32,
        total_pages: u32,
    },
    /// A transient, non-blocking notice.
    Notice { level: NoticeLevel, message: String },
    /// Client-side validation rejected the sheet; no upload was attempted.
    /// Carries every offending row so the operator can fix the whole sheet
    /// in one pass.
    ValidationFailed { violations: Vec<RowViolation> },
    UploadStarted { file_name: String },
    UploadFinished { file_name: String, total_pages: u32 },
    UploadCancelled,
    ExportProgress(DownloadProgress),
    ExportFinished { path: PathBuf, rows: usize },
    ExportCancelled,
    /// A 401-class response was seen; local auth state must be discarded
    /// and the operator returned to an unauthenticated view.
    SessionExpired,
}
