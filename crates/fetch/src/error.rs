//! Fetch error types

use thiserror::Error;

/// Document retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Path could not be turned into a request URL
    #[error("Could not create request: '{message}'")]
    InvalidRequest { message: String },

    /// Transport-level failure talking to the document service
    #[error("HTTP Client Error: '{message}'")]
    Client {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response arrived without a body
    #[error("HTTP response body was nil: '{path}'")]
    MissingBody { path: String },

    /// Body could not be decompressed or decoded
    #[error("Document read error: '{message}'")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FetchError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
            source: None,
        }
    }

    pub fn decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Client {
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}
