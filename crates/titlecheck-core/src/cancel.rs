//! Per-operation cancellation slots.
//!
//! Each operation kind (upload, export) owns exactly one slot. Arming a
//! slot hands out a fresh token and invalidates the previous one, so a
//! stray cancel aimed at a superseded operation can never reach the
//! current one.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub(crate) struct CancelSlot {
    seq: u64,
    current: Option<CancellationToken>,
}

impl CancelSlot {
    /// Install a fresh token, superseding any previous one. Returns the
    /// token plus a sequence number for [`disarm`](Self::disarm).
    pub fn arm(&mut self) -> (u64, CancellationToken) {
        self.seq += 1;
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        (self.seq, token)
    }

    /// Clear the slot, but only if it still belongs to the arm that is
    /// finishing. A later arm's token stays untouched.
    pub fn disarm(&mut self, seq: u64) {
        if self.seq == seq {
            self.current = None;
        }
    }

    /// Cancel whatever operation currently holds the slot, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = &self.current {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }
}
