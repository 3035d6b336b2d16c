//! Gateway trait: the seam between the orchestration core and the remote
//! service. Production code uses [`titlecheck_api::ApiClient`]; tests use
//! hand-rolled mocks.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use titlecheck_api::{ApiClient, ApiError, PageResult, UploadPayload};

pub type GatewayResult = Result<PageResult, ApiError>;

/// The two network operations the core depends on, plus the initial
/// upload. Every operation may fail with a network error or resolve as
/// cancelled via the supplied token.
pub trait Gateway: Send + Sync {
    /// Paginated read (Browse/Search path). Empty query means Browse.
    fn fetch_page<'a>(
        &'a self,
        query: &'a str,
        page: u32,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = GatewayResult> + Send + 'a>>;

    /// Replay a previous upload with a different page parameter
    /// (UploadedView path).
    fn requery_upload<'a>(
        &'a self,
        payload: &'a UploadPayload,
        page: u32,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = GatewayResult> + Send + 'a>>;

    /// Initial multipart upload; returns the first page of the
    /// server-derived view.
    fn upload<'a>(
        &'a self,
        payload: &'a UploadPayload,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = GatewayResult> + Send + 'a>>;
}

impl Gateway for ApiClient {
    fn fetch_page<'a>(
        &'a self,
        query: &'a str,
        page: u32,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = GatewayResult> + Send + 'a>> {
        Box::pin(ApiClient::fetch_page(self, query, page, cancel))
    }

    fn requery_upload<'a>(
        &'a self,
        payload: &'a UploadPayload,
        page: u32,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = GatewayResult> + Send + 'a>> {
        Box::pin(ApiClient::requery_upload(self, payload, page, cancel))
    }

    fn upload<'a>(
        &'a self,
        payload: &'a UploadPayload,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = GatewayResult> + Send + 'a>> {
        Box::pin(ApiClient::upload(self, payload, cancel))
    }
}
