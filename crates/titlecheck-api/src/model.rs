//! Semantic model shared by every consumer of the gateway.

/// One conference's decision/comment set for a record.
///
/// Empty strings mean "not yet set"; the server omits fields it has no
/// value for and the wire adapter normalizes them to `""`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConferenceEntry {
    pub conference_name: String,
    pub decision_with_comments: String,
    pub precheck_comments: String,
    pub firstset_comments: String,
}

/// One manuscript title with zero or more conference submissions.
///
/// `conferences` keeps the server's ordering and is never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileRecord {
    pub title: String,
    pub conferences: Vec<ConferenceEntry>,
}

/// Normalized response shape of every paginated gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<FileRecord>,
    pub total_pages: u32,
}

/// The exact bytes of an uploaded spreadsheet, retained so the same upload
/// can be replayed with a different page parameter (the server re-derives
/// the paginated view from the file on every request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
