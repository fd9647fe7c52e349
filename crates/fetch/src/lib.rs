//! # Fetch
//!
//! Document retrieval for start-up code and request helpers.
//!
//! Responsibilities:
//! - GET JSON documents, decompressing gzip bodies
//! - Treat 404 as "no document" rather than an error
//! - Extract client address and numeric values from request headers

pub mod client;
pub mod error;
pub mod headers;
pub mod reader;

pub use client::{HttpClient, HttpResponse, ReqwestClient};
pub use error::FetchError;
pub use headers::{client_ip_address, extract_u64_header};
pub use reader::DocumentReader;
pub use reqwest::Url;
