//! The request execution seam.

use crate::{HttpRequest, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes one HTTP exchange.
///
/// Implementations perform exactly one call per `execute` and hand back the
/// buffered response, whatever its status code. Interpreting the status is
/// the caller's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and wait for the complete response.
    async fn execute(&self, request: HttpRequest) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<Response> {
        (**self).execute(request).await
    }
}
