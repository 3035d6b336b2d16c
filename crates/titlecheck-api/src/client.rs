//! HTTP client for the review record service.

use std::sync::RwLock;

use tokio_util::sync::CancellationToken;

use crate::model::{PageResult, UploadPayload};
use crate::wire::{FileGetResponse, FileUploadResponse};
use crate::ApiError;

/// MIME type attached to replayed upload parts.
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Client for the two file endpoints plus the auth endpoints.
///
/// Holds the bearer token for the current operator session. All operations
/// race the request against the supplied [`CancellationToken`], so a cancel
/// resolves as [`ApiError::Cancelled`] rather than a transport failure.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
            token: RwLock::new(None),
        }
    }

    pub fn with_token(base_url: impl Into<String>, token: Option<String>) -> Self {
        let client = Self::new(base_url);
        *client.token.write().unwrap() = token;
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: String) {
        *self.token.write().unwrap() = Some(token);
    }

    /// Discard the local auth state. Called on forced logout.
    pub fn clear_token(&self) {
        *self.token.write().unwrap() = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn multipart_form(payload: &UploadPayload) -> Result<reqwest::multipart::Form, ApiError> {
        let part = reqwest::multipart::Part::bytes(payload.bytes.clone())
            .file_name(payload.file_name.clone())
            .mime_str(XLSX_MIME)
            .map_err(ApiError::Http)?;
        Ok(reqwest::multipart::Form::new().part("file", part))
    }

    /// Paginated read over `file-get` (Browse/Search path).
    ///
    /// An empty `query` is the Browse path; the server treats it as
    /// "no filter".
    pub async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let url = format!(
            "{}/api/v1/file/file-get?q={}&page={}",
            self.base_url,
            urlencoding::encode(query),
            page
        );
        tracing::debug!(page, query, "fetching records page");

        let request = async {
            let resp = self.authorized(self.http.get(&url)).send().await?;
            match resp.status().as_u16() {
                401 => Err(ApiError::Unauthorized),
                s if s >= 400 => Err(ApiError::Status(s)),
                _ => Ok(resp
                    .json::<FileGetResponse>()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?
                    .into_page_result()),
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = request => result,
        }
    }

    /// Re-send a previously uploaded file with a different page parameter.
    ///
    /// The server computes the paginated view from the file itself, so the
    /// UploadedView path replays the same multipart body for every page.
    pub async fn requery_upload(
        &self,
        payload: &UploadPayload,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ApiError> {
        tracing::debug!(page, file = %payload.file_name, "re-querying uploaded file");
        self.post_upload(payload, page, cancel).await
    }

    /// Initial upload of a spreadsheet; returns the first page of the
    /// server-derived view.
    pub async fn upload(
        &self,
        payload: &UploadPayload,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ApiError> {
        tracing::info!(file = %payload.file_name, bytes = payload.bytes.len(), "uploading spreadsheet");
        self.post_upload(payload, 1, cancel).await
    }

    async fn post_upload(
        &self,
        payload: &UploadPayload,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<PageResult, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let url = format!("{}/api/v1/file/file-upload?page={}", self.base_url, page);
        let form = Self::multipart_form(payload)?;

        let request = async {
            let resp = self
                .authorized(self.http.post(&url))
                .multipart(form)
                .send()
                .await?;
            match resp.status().as_u16() {
                401 => Err(ApiError::Unauthorized),
                s if s >= 400 => Err(ApiError::Status(s)),
                _ => Ok(resp
                    .json::<FileUploadResponse>()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?
                    .into_page_result()),
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = request => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn token_slot_roundtrip() {
        let client = ApiClient::new("http://localhost:8000");
        assert!(client.token().is_none());
        client.set_token("abc".into());
        assert_eq!(client.token().as_deref(), Some("abc"));
        client.clear_token();
        assert!(client.token().is_none());
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let client = ApiClient::new("http://localhost:1");
        let cancel = CancellationToken::new();
        cancel.cancel();
        // The cancelled branch must win without touching the network.
        let err = client.fetch_page("", 1, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
