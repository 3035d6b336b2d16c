//! Upload pipeline: type gate, client-side validation, exclusion-set
//! extraction, then a cancellable multipart send.

use titlecheck_api::UploadPayload;
use titlecheck_ingest::{
    excluded_conference_names, is_accepted_mime, parse_sheet, validate_rows, RowViolation,
};

use crate::session::{Session, UploadedFileData};
use crate::{CoreError, NoticeLevel, SessionEvent};

/// A spreadsheet as picked by the operator: declared type plus raw bytes.
#[derive(Debug, Clone)]
pub struct SpreadsheetFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// How an upload attempt ended. Rejection and cancellation are normal
/// resolutions, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { total_pages: u32 },
    /// Client-side validation failed; nothing was sent.
    Rejected(Vec<RowViolation>),
    Cancelled,
}

impl Session {
    /// Run the upload pipeline for a picked file.
    ///
    /// The sheet is parsed and validated entirely client-side first: a bad
    /// file costs no network traffic, and every offending row is reported
    /// at once. Only a clean sheet is sent, under a fresh cancel handle
    /// that supersedes any previous upload's handle.
    pub async fn upload(&self, file: SpreadsheetFile) -> Result<UploadOutcome, CoreError> {
        if !is_accepted_mime(&file.mime) {
            self.notice(NoticeLevel::Error, "Only Excel files are allowed.");
            return Err(CoreError::UnsupportedFileType(file.mime));
        }

        let rows = parse_sheet(&file.bytes)?;
        let violations = validate_rows(&rows);
        if !violations.is_empty() {
            self.notice(
                NoticeLevel::Error,
                format!(
                    "{} row(s) are missing required fields.",
                    violations.len()
                ),
            );
            self.send(SessionEvent::ValidationFailed {
                violations: violations.clone(),
            });
            return Ok(UploadOutcome::Rejected(violations));
        }

        let excluded = excluded_conference_names(&rows);

        let (seq, cancel) = self.state.lock().unwrap().upload_cancel.arm();
        self.send(SessionEvent::UploadStarted {
            file_name: file.name.clone(),
        });

        let payload = UploadPayload {
            file_name: file.name,
            bytes: file.bytes,
        };
        let file_name = payload.file_name.clone();

        let result = self.gateway.upload(&payload, &cancel).await;

        let outcome = match result {
            Ok(page) => {
                let total_pages = page.total_pages;
                let event = {
                    let mut state = self.state.lock().unwrap();
                    state.view.upload_succeeded(total_pages, excluded);
                    state.uploaded = Some(UploadedFileData {
                        payload,
                        last_response: page.records.clone(),
                    });
                    state.table = page.records;
                    SessionEvent::TableReplaced {
                        records: state.table.len(),
                        page: 1,
                        total_pages: state.view.total_pages(),
                    }
                };
                self.send(event);
                self.send(SessionEvent::UploadFinished {
                    file_name,
                    total_pages,
                });
                self.notice(NoticeLevel::Success, "File uploaded successfully!");
                Ok(UploadOutcome::Uploaded { total_pages })
            }
            Err(err) if err.is_cancelled() => {
                // Pre-upload state stays exactly as it was.
                self.send(SessionEvent::UploadCancelled);
                self.notice(NoticeLevel::Warning, "Upload cancelled.");
                Ok(UploadOutcome::Cancelled)
            }
            Err(err) => {
                self.handle_api_error(&err, "Upload failed. Please try again.");
                Err(err.into())
            }
        };

        self.state.lock().unwrap().upload_cancel.disarm(seq);
        outcome
    }
}
