//! Debounced fetch scheduling.
//!
//! Bursts of query/page changes are coalesced into a single settled fetch
//! with a classic trailing-edge debounce: every new spec restarts the
//! window. A settled spec is fetched on its own task so the debounce loop
//! keeps accepting new bursts while the network call resolves; the commit
//! side (see [`Session::perform_fetch`](crate::session::Session)) discards
//! any response whose spec no longer matches the current view.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::session::Session;
use crate::view::ViewMode;

/// Inactivity window before a burst of schedule calls settles.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// The tuple a fetch is debounced, dispatched and committed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec {
    pub query: String,
    pub page: u32,
    pub mode: ViewMode,
}

/// Handle for feeding specs into the debounce worker.
pub(crate) struct FetchScheduler {
    tx: mpsc::UnboundedSender<FetchSpec>,
}

impl FetchScheduler {
    /// Spawn the debounce worker. It holds the session weakly so dropping
    /// the session tears the worker down.
    pub fn spawn(session: Weak<Session>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<FetchSpec>();

        tokio::spawn(async move {
            while let Some(mut spec) = rx.recv().await {
                // Trailing-edge debounce: restart the window on every
                // newer spec until DEBOUNCE_WINDOW of inactivity passes.
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(newer) => spec = newer,
                            None => return,
                        },
                        _ = tokio::time::sleep(DEBOUNCE_WINDOW) => break,
                    }
                }

                let Some(session) = session.upgrade() else {
                    return;
                };
                tracing::debug!(?spec, "debounce settled");
                // Do not await the fetch here: an in-flight call must not
                // delay the next debounce window.
                tokio::spawn(async move {
                    session.perform_fetch(spec).await;
                });
            }
        });

        Self { tx }
    }

    /// Feed a new spec into the debounce window.
    pub fn schedule(&self, spec: FetchSpec) {
        let _ = self.tx.send(spec);
    }
}
