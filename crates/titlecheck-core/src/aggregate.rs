//! Bulk export aggregator: walk every server page of the active source,
//! then hand the aggregate to the formatter and write the artifact.
//!
//! Pages are fetched sequentially: the server is not trusted to tolerate
//! concurrent identical requests, and sequential access lets
//! cancellation take effect between pages. The walk keeps its own page
//! counter, independent of the view's cursor, so the operator can keep
//! browsing while an export runs.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use titlecheck_api::{ApiError, FileRecord, PageResult, UploadPayload};
use titlecheck_reporting::{export_file_name, write_export};

use crate::format::format_export_rows;
use crate::session::Session;
use crate::view::ViewMode;
use crate::{CoreError, DownloadProgress, NoticeLevel, SessionEvent};

/// How an export attempt ended. Cancellation and an empty source are
/// normal resolutions, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    Cancelled,
    Empty,
}

impl Session {
    /// Export the currently active source to a spreadsheet in `out_dir`.
    ///
    /// A cancelled export discards all partial results, performs no file
    /// write, and resets the progress indicator to `{0, 0}`.
    pub async fn export(&self, out_dir: &Path) -> Result<ExportOutcome, CoreError> {
        // Snapshot the active source; the walk must not chase view
        // changes made while it runs.
        let (query, mode, payload, excluded) = {
            let state = self.state.lock().unwrap();
            (
                state.view.query().to_string(),
                state.view.mode(),
                state.uploaded.as_ref().map(|u| u.payload.clone()),
                state.view.excluded_conference_names().clone(),
            )
        };
        let search_active = !query.trim().is_empty();

        let (seq, cancel) = self.state.lock().unwrap().export_cancel.arm();
        self.set_progress(DownloadProgress::default());

        let walk = self
            .walk_pages(&query, mode, payload.as_ref(), &cancel)
            .await;

        let outcome = match walk {
            Ok(Some(records)) if records.is_empty() => {
                self.notice(NoticeLevel::Error, "No data to download.");
                Ok(ExportOutcome::Empty)
            }
            Ok(Some(records)) => {
                let rows = format_export_rows(&records, &excluded);
                let path = out_dir.join(export_file_name(search_active));
                match write_export(&path, &rows) {
                    Ok(()) => {
                        self.send(SessionEvent::ExportFinished {
                            path: path.clone(),
                            rows: rows.len(),
                        });
                        self.notice(
                            NoticeLevel::Success,
                            format!(
                                "Download completed! {} records exported successfully.",
                                rows.len()
                            ),
                        );
                        Ok(ExportOutcome::Written {
                            path,
                            rows: rows.len(),
                        })
                    }
                    Err(err) => {
                        self.notice(NoticeLevel::Error, "Failed to write export file.");
                        Err(CoreError::Export(err))
                    }
                }
            }
            Ok(None) => {
                self.send(SessionEvent::ExportCancelled);
                self.notice(NoticeLevel::Warning, "Download cancelled.");
                Ok(ExportOutcome::Cancelled)
            }
            Err(err) => {
                self.handle_api_error(&err, "Failed to download data. Please try again.");
                Err(err.into())
            }
        };

        self.set_progress(DownloadProgress::default());
        self.state.lock().unwrap().export_cancel.disarm(seq);
        outcome
    }

    /// Sequential page walk. `Ok(None)` means cancelled; `Ok(Some(..))`
    /// is the full aggregate.
    async fn walk_pages(
        &self,
        query: &str,
        mode: ViewMode,
        payload: Option<&UploadPayload>,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<FileRecord>>, ApiError> {
        if cancel.is_cancelled() {
            return Ok(None);
        }

        // Page 1 establishes the page count.
        let first = match self.export_fetch(query, mode, payload, 1, cancel).await {
            Ok(page) => page,
            Err(err) if err.is_cancelled() => return Ok(None),
            Err(err) => return Err(err),
        };
        let total_pages = first.total_pages;
        self.set_progress(DownloadProgress {
            current: 0,
            total: total_pages,
        });

        let mut all = Vec::new();
        if first.records.is_empty() {
            return Ok(Some(all));
        }
        all.extend(first.records);
        self.set_progress(DownloadProgress {
            current: 1,
            total: total_pages,
        });

        let mut page = 2;
        while page <= total_pages {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let result = match self.export_fetch(query, mode, payload, page, cancel).await {
                Ok(page_data) => page_data,
                Err(err) if err.is_cancelled() => return Ok(None),
                Err(err) => return Err(err),
            };
            if result.records.is_empty() {
                // Invariant: reported total_page and actual page content
                // can disagree; an empty page ends the walk.
                tracing::warn!(page, total_pages, "empty page before reported total");
                break;
            }
            all.extend(result.records);
            self.set_progress(DownloadProgress {
                current: page,
                total: total_pages,
            });
            page += 1;
        }

        Ok(Some(all))
    }

    /// The gateway operation backing the active source.
    async fn export_fetch(
        &self,
        query: &str,
        mode: ViewMode,
        payload: Option<&UploadPayload>,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ApiError> {
        match mode {
            ViewMode::Search => self.gateway.fetch_page(query, page, cancel).await,
            ViewMode::UploadedView => match payload {
                Some(payload) => self.gateway.requery_upload(payload, page, cancel).await,
                None => self.gateway.fetch_page("", page, cancel).await,
            },
            ViewMode::Browse => self.gateway.fetch_page("", page, cancel).await,
        }
    }

    fn set_progress(&self, progress: DownloadProgress) {
        self.state.lock().unwrap().progress = progress;
        self.send(SessionEvent::ExportProgress(progress));
    }
}
