//! Scripted in-memory transport.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::{HttpClientError, HttpRequest, Response, Result, Transport};

/// A [`Transport`] that answers from a queue of canned responses.
///
/// Every executed request is recorded so tests can assert on what was sent.
/// Running out of responses is an [`HttpClientError::Unscripted`] error.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn respond(&self, status: u16, body: impl Into<Bytes>) -> &Self {
        self.respond_with(status, &[], body)
    }

    /// Queue a response with the given status, headers and body.
    pub fn respond_with(
        &self,
        status: u16,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> &Self {
        let scripted = Scripted {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: body.into(),
        };
        self.responses.lock().push_back(Ok(scripted));
        self
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: HttpClientError) -> &Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Requests executed so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }
}

struct Scripted {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<Response> {
        let method = request.method().to_string();
        let display_url = request.url().to_string();
        let url = request.resolve_url(None);
        self.requests.lock().push(request);
        let url = url?;

        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok(scripted)) => {
                let mut response =
                    Response::new(scripted.status, HeaderMap::new(), scripted.body, url);
                for (name, value) in &scripted.headers {
                    response = response.with_header(name, value);
                }
                Ok(response)
            }
            Some(Err(e)) => Err(e),
            None => Err(HttpClientError::Unscripted {
                method,
                url: display_url,
            }),
        }
    }
}
