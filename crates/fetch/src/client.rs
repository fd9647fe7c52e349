//! HTTP client abstraction
//!
//! The document reader only needs "GET this URL"; keeping that behind a trait
//! lets tests substitute canned responses.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use tracing::{debug, instrument};

use crate::error::FetchError;

/// Response as seen by the document reader
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` when the response carried no body at all
    pub body: Option<Bytes>,
}

impl HttpResponse {
    /// 200 response with a body and no headers
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }

    /// Response with the given status and no body
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Minimal GET client
pub trait HttpClient: Send + Sync {
    fn get(&self, url: Url) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// [`HttpClient`] backed by reqwest
///
/// Transparent decompression is left off: the reader handles gzip itself so
/// every client behaves the same.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }
}

impl HttpClient for ReqwestClient {
    #[instrument(name = "reqwest_get", skip(self), fields(url = %url))]
    async fn get(&self, url: Url) -> Result<HttpResponse, FetchError> {
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(status = %status, bytes = body.len(), "Response received");

        Ok(HttpResponse {
            status,
            headers,
            body: Some(body),
        })
    }
}
