//! # Moneta HTTP
//!
//! The transport layer of the moneta payment SDK: a thin, timeout-aware HTTP
//! client and the [`Transport`] seam the protocol code executes requests
//! through.
//!
//! ## Features
//!
//! - **Owned requests**: [`HttpRequest`] values can be built, inspected and
//!   replayed without a client at hand
//! - **Buffered responses**: [`Response`] carries status, headers and the whole body
//! - **Timeouts**: Per-request and global timeout configuration
//! - **Pluggable transport**: anything implementing [`Transport`] can stand in
//!   for the network, including the scripted [`MockTransport`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moneta_http::{HttpClient, HttpClientConfig, HttpRequest, Method, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default())?;
//!
//!     let response = client
//!         .execute(HttpRequest::new(Method::GET, "https://yoomoney.ru/api/showcase/5551"))
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! Transport failures are reported as [`HttpClientError`] and are never
//! retried here; deciding what to do with them is left to the caller.

mod client;
mod config;
mod error;
mod mock;
mod request;
mod response;
mod transport;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder, PoolConfig, Redirects};
pub use error::{HttpClientError, Result};
pub use mock::MockTransport;
pub use request::HttpRequest;
pub use response::Response;
pub use transport::Transport;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use moneta_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder, Redirects};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::mock::MockTransport;
    pub use crate::request::HttpRequest;
    pub use crate::response::Response;
    pub use crate::transport::Transport;
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
}
