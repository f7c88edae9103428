//! API requests and the client that executes them

use crate::{
    config::{ClientConfig, Hosts},
    error::{PaymentError, PaymentResult},
    params::ParameterMap,
};
use moneta_http::{HttpRequest, Method, Response, Transport};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A single call to the service
///
/// Describes how to build the HTTP request and how to read the answer.
/// Parameters travel as a form body for methods that carry one and as a
/// query string otherwise.
pub trait ApiRequest: Send {
    /// What a successful exchange yields
    type Output: Send;

    /// HTTP method
    fn method(&self) -> Method;

    /// Absolute request URL
    fn url(&self, hosts: &Hosts) -> String;

    /// Extra request headers
    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Request parameters
    fn parameters(&self) -> &ParameterMap;

    /// Form-encoded body, for methods that carry one
    fn body(&self) -> Option<String> {
        supports_body(&self.method()).then(|| self.parameters().to_form_body())
    }

    /// Interpret the response
    fn parse(self, response: Response) -> PaymentResult<Self::Output>
    where
        Self: Sized;
}

/// Whether the method sends parameters in the body
pub fn supports_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::DELETE && *method != Method::HEAD
}

/// Executes [`ApiRequest`]s over a [`Transport`]
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    access_token: Option<SecretString>,
}

impl ApiClient {
    /// Create a client
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        let access_token = config.access_token.clone();
        Self {
            transport,
            config: Arc::new(config),
            access_token,
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Service endpoints
    pub fn hosts(&self) -> &Hosts {
        &self.config.hosts
    }

    /// Set or clear the access token used for authorized sessions
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token.map(|t| SecretString::new(t.into()));
    }

    /// Is an access token set
    pub fn is_authorized(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build the HTTP request for an API request
    pub fn build_request<R: ApiRequest>(&self, request: &R) -> HttpRequest {
        let method = request.method();
        let url = request.url(&self.config.hosts);
        let params = request.parameters();

        let mut http = match request.body() {
            Some(body) => HttpRequest::new(method, url).body(FORM_CONTENT_TYPE, body),
            None => HttpRequest::new(method, url).queries(params.transmittable()),
        };

        http = http
            .header("User-Agent", self.config.user_agent.as_str())
            .timeout(self.config.timeout);

        if let Some(token) = &self.access_token {
            http = http.bearer_auth(token.expose_secret());
        }

        for (name, value) in request.headers() {
            http = http.header(name, value);
        }

        http
    }

    /// Execute a request and parse its response
    ///
    /// Transport errors come back as [`PaymentError::Network`] and are not retried.
    pub async fn execute<R: ApiRequest>(&self, request: R) -> PaymentResult<R::Output> {
        let http = self.build_request(&request);
        debug!(method = %http.method(), url = %http.url(), "Executing API request");

        let response = self.transport.execute(http).await?;
        debug!(status = %response.status(), "API response received");

        request.parse(response)
    }
}

/// Decode a JSON method response
///
/// 200 yields the document; the documented error codes map onto
/// [`PaymentError`] variants and anything else is a protocol error.
pub fn parse_json_response<T: DeserializeOwned>(response: &Response) -> PaymentResult<T> {
    match response.status().as_u16() {
        200 => Ok(serde_json::from_slice(response.bytes())?),
        400 => Err(PaymentError::InvalidRequest(error_detail(response))),
        401 => Err(PaymentError::InvalidToken(error_detail(response))),
        403 => Err(PaymentError::InsufficientScope(error_detail(response))),
        404 => Err(PaymentError::ResourceNotFound {
            url: response.url().to_string(),
        }),
        _ => Err(PaymentError::protocol(response)),
    }
}

/// Error description from `WWW-Authenticate` or the body
fn error_detail(response: &Response) -> String {
    response
        .header("www-authenticate")
        .map(str::to_string)
        .unwrap_or_else(|| response.text_lossy())
}
