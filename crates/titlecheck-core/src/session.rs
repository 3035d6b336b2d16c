//! The session facade: owns the view state, the visible table, the
//! uploaded file data and both cancellation slots, and wires the debounce
//! scheduler to the gateway.
//!
//! All lock scopes are synchronous; network calls are awaited only with
//! the state lock released.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use titlecheck_api::{ApiError, FileRecord, PageResult, UploadPayload};

use crate::cancel::CancelSlot;
use crate::format::apply_exclusions;
use crate::gateway::Gateway;
use crate::scheduler::{FetchScheduler, FetchSpec};
use crate::view::{ViewMode, ViewState};
use crate::{DownloadProgress, NoticeLevel, SessionEvent};

/// A successful upload, retained so the UploadedView can be re-queried
/// page by page with the exact same bytes.
#[derive(Debug, Clone)]
pub struct UploadedFileData {
    pub payload: UploadPayload,
    pub last_response: Vec<FileRecord>,
}

#[derive(Default)]
pub(crate) struct SessionState {
    pub(crate) view: ViewState,
    pub(crate) table: Vec<FileRecord>,
    pub(crate) uploaded: Option<UploadedFileData>,
    pub(crate) upload_cancel: CancelSlot,
    pub(crate) export_cancel: CancelSlot,
    pub(crate) progress: DownloadProgress,
}

pub struct Session {
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    scheduler: FetchScheduler,
}

impl Session {
    /// Create a session over the given gateway. Events are pushed to
    /// `events` as they happen; the channel is never awaited on.
    pub fn new(gateway: Arc<dyn Gateway>, events: mpsc::UnboundedSender<SessionEvent>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Session {
            gateway,
            state: Mutex::new(SessionState::default()),
            events,
            scheduler: FetchScheduler::spawn(weak.clone()),
        })
    }

    // ── operator inputs ─────────────────────────────────────────────

    /// Query text changed. Debounced; the mode transition happens now,
    /// the fetch after the window settles.
    pub fn set_query(&self, query: &str) {
        let spec = {
            let mut state = self.state.lock().unwrap();
            state.view.set_query(query);
            state.view.fetch_spec()
        };
        self.scheduler.schedule(spec);
    }

    /// Pagination cursor changed. Debounced like query edits, so rapid
    /// next-next-next clicks settle into one fetch.
    pub fn set_page(&self, page: u32) {
        let spec = {
            let mut state = self.state.lock().unwrap();
            state.view.set_page(page);
            state.view.fetch_spec()
        };
        self.scheduler.schedule(spec);
    }

    /// Re-issue the active source's fetch immediately, without debounce.
    pub async fn refresh(&self) {
        let spec = self.state.lock().unwrap().view.fetch_spec();
        if self.perform_fetch(spec.clone()).await {
            let message = match spec.mode {
                ViewMode::Search => "Search results refreshed!",
                ViewMode::UploadedView => "Uploaded data refreshed!",
                ViewMode::Browse => "Database records refreshed!",
            };
            self.notice(NoticeLevel::Success, message);
        }
    }

    /// Explicit reset: query, cursor, uploaded data, exclusions and table
    /// are cleared together, back to Browse.
    pub fn reset(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.view.reset();
            state.uploaded = None;
            state.table.clear();
        }
        self.send(SessionEvent::TableReplaced {
            records: 0,
            page: 1,
            total_pages: 1,
        });
    }

    /// Cancel the in-flight upload, if any. Resolves the pipeline as
    /// cancelled, not failed.
    pub fn cancel_upload(&self) {
        self.state.lock().unwrap().upload_cancel.cancel();
    }

    /// Cancel the in-flight bulk export, if any. Partial results are
    /// discarded and no file is written.
    pub fn cancel_export(&self) {
        self.state.lock().unwrap().export_cancel.cancel();
    }

    // ── accessors ───────────────────────────────────────────────────

    /// The raw server-held table for the current page.
    pub fn table(&self) -> Vec<FileRecord> {
        self.state.lock().unwrap().table.clone()
    }

    /// The table as the operator sees it: entries from excluded
    /// conferences removed, emptied records hidden.
    pub fn visible_table(&self) -> Vec<FileRecord> {
        let state = self.state.lock().unwrap();
        apply_exclusions(&state.table, state.view.excluded_conference_names())
    }

    pub fn view(&self) -> ViewState {
        self.state.lock().unwrap().view.clone()
    }

    pub fn progress(&self) -> DownloadProgress {
        self.state.lock().unwrap().progress
    }

    pub fn uploaded_file_name(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .uploaded
            .as_ref()
            .map(|u| u.payload.file_name.clone())
    }

    // ── fetch path ──────────────────────────────────────────────────

    /// Dispatch a settled fetch spec to the right gateway operation and
    /// commit the response if it is still current. Returns whether the
    /// response was committed.
    pub(crate) async fn perform_fetch(&self, spec: FetchSpec) -> bool {
        // Table fetches are not operator-cancellable; the token only
        // satisfies the gateway contract.
        let cancel = CancellationToken::new();

        let result = if !spec.query.trim().is_empty() {
            self.gateway
                .fetch_page(&spec.query, spec.page, &cancel)
                .await
        } else if spec.mode == ViewMode::UploadedView {
            let payload = {
                let state = self.state.lock().unwrap();
                state.uploaded.as_ref().map(|u| u.payload.clone())
            };
            match payload {
                Some(payload) => {
                    self.gateway
                        .requery_upload(&payload, spec.page, &cancel)
                        .await
                }
                // Upload vanished under us (reset raced the debounce);
                // fall back to browsing.
                None => self.gateway.fetch_page("", spec.page, &cancel).await,
            }
        } else {
            self.gateway.fetch_page("", spec.page, &cancel).await
        };

        match result {
            Ok(page) => self.commit_page(&spec, page),
            Err(err) => {
                self.handle_api_error(&err, "Failed to fetch data. Please try again.");
                false
            }
        }
    }

    /// Last relevant write wins: a response is committed only while its
    /// spec still matches the current view; anything else is stale and
    /// discarded.
    fn commit_page(&self, spec: &FetchSpec, page: PageResult) -> bool {
        let event = {
            let mut state = self.state.lock().unwrap();
            if state.view.fetch_spec() != *spec {
                tracing::debug!(?spec, "discarding stale fetch response");
                return false;
            }
            state.view.set_total_pages(page.total_pages);
            state.table = page.records;
            SessionEvent::TableReplaced {
                records: state.table.len(),
                page: state.view.page(),
                total_pages: state.view.total_pages(),
            }
        };
        self.send(event);
        true
    }

    // ── plumbing ────────────────────────────────────────────────────

    pub(crate) fn send(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.send(SessionEvent::Notice {
            level,
            message: message.into(),
        });
    }

    /// Map a gateway failure onto the error taxonomy: 401 forces a
    /// session termination, cancellation is silent, everything else is a
    /// transient notice. Local state is never touched here.
    pub(crate) fn handle_api_error(&self, err: &ApiError, context: &str) {
        if err.is_unauthorized() {
            tracing::warn!("authorization failure; forcing logout");
            self.notice(NoticeLevel::Error, "Session expired. Please log in again.");
            self.send(SessionEvent::SessionExpired);
        } else if !err.is_cancelled() {
            tracing::warn!(error = %err, "gateway operation failed");
            self.notice(NoticeLevel::Error, context);
        }
    }
}
