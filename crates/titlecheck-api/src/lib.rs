use thiserror::Error;

pub mod auth;
pub mod client;
pub mod model;
mod wire;

// Re-export for convenience
pub use client::ApiClient;
pub use model::{ConferenceEntry, FileRecord, PageResult, UploadPayload};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("session expired (401)")]
    Unauthorized,
    #[error("operation cancelled")]
    Cancelled,
    #[error("malformed server response: {0}")]
    Decode(String),
}

impl ApiError {
    /// User-initiated abort, as opposed to a genuine failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// A 401-class response that must force a session termination.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
