//! HTTP client implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{
    HttpClientConfig, HttpClientError, HttpRequest, Response, Result, Transport,
    config::Redirects,
};

/// reqwest-backed HTTP client with timeout support.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let redirect = match config.redirects {
            Redirects::Manual => reqwest::redirect::Policy::none(),
            Redirects::Follow { max } => reqwest::redirect::Policy::limited(max),
        };

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool.idle_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.compression)
            .brotli(config.compression)
            .redirect(redirect)
            .build()?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn to_reqwest(&self, request: HttpRequest) -> Result<reqwest::Request> {
        let url = request.resolve_url(self.config.base_url.as_deref())?;
        let (method, headers, body, timeout) = request.into_parts();

        let mut builder = self.inner.request(method, url);

        for (name, value) in &self.config.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<Response> {
        let request = self.to_reqwest(request)?;
        let timeout = request.timeout().copied().unwrap_or(self.config.timeout);
        debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self
            .inner
            .execute(request)
            .await
            .map_err(|e| HttpClientError::from_send(e, timeout))?;
        let response = Response::from_reqwest(response).await?;

        debug!(
            status = %response.status(),
            url = %response.url(),
            bytes = response.bytes().len(),
            "Received response"
        );
        Ok(response)
    }
}
