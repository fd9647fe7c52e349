//! DocumentReader - GET a JSON document, gzip-aware

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use observability::metrics::record_document_fetch;
use reqwest::header::CONTENT_ENCODING;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument};

use crate::client::{HttpClient, HttpResponse};
use crate::error::FetchError;

/// Reads JSON documents from a document service
pub struct DocumentReader<H: HttpClient> {
    client: H,
    base_url: Option<Url>,
}

impl<H: HttpClient> DocumentReader<H> {
    /// Reader that expects absolute URLs
    pub fn new(client: H) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Reader resolving relative paths against `base_url`
    pub fn with_base_url(client: H, base_url: Url) -> Self {
        Self {
            client,
            base_url: Some(base_url),
        }
    }

    /// Fetch and decode the document at `path`
    ///
    /// Returns `Ok(None)` when the service answers 404. Any other status is
    /// decoded like a success.
    ///
    /// # Errors
    /// - `InvalidRequest` when `path` is not a valid URL (the client is not called)
    /// - `Client` on transport failure
    /// - `MissingBody` when the response has no body
    /// - `Decode` when decompression or JSON decoding fails
    #[instrument(name = "document_reader_read", skip(self))]
    pub async fn read<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, FetchError> {
        let url = self.resolve(path)?;
        let response = self.client.get(url).await.inspect_err(|_| {
            record_document_fetch("error");
        })?;

        if response.status == StatusCode::NOT_FOUND {
            info!("Document not found at '{}'", path);
            record_document_fetch("not_found");
            return Ok(None);
        }

        let result = decode(path, response);
        record_document_fetch(if result.is_ok() { "found" } else { "error" });
        result.map(Some)
    }

    /// Fetch-or-die variant for start-up code
    ///
    /// # Panics
    /// Panics on any error `read` would return.
    pub async fn load<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.read(path).await {
            Ok(document) => document,
            Err(e) => {
                error!(path = %path, error = %e, "Required document could not be loaded");
                panic!("{e}");
            }
        }
    }

    fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        let parsed = match &self.base_url {
            Some(base) => base.join(path),
            None => Url::parse(path),
        };
        parsed.map_err(|e| FetchError::invalid_request(format!("parse {path}: {e}")))
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: HttpResponse) -> Result<T, FetchError> {
    let body = response.body.ok_or_else(|| FetchError::MissingBody {
        path: path.to_string(),
    })?;

    let gzipped = response
        .headers
        .get(CONTENT_ENCODING)
        .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"gzip"));

    let plain = if gzipped { gunzip(&body)? } else { body };
    serde_json::from_slice(&plain).map_err(FetchError::decode)
}

fn gunzip(body: &[u8]) -> Result<Bytes, FetchError> {
    let mut plain = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut plain)
        .map_err(FetchError::decode)?;
    Ok(Bytes::from(plain))
}
