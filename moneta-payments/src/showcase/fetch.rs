//! Conditional retrieval of form documents

use super::Showcase;
use crate::{
    api::ApiRequest,
    config::Hosts,
    error::{PaymentError, PaymentResult},
    params::ParameterMap,
    time::{format_http_date, parse_http_date},
};
use chrono::{DateTime, Utc};
use moneta_http::{Method, Response};
use tracing::warn;

/// Whether a conditional fetch returned a body
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
    /// A fresh document
    Document(T),
    /// The cached copy is still current (304)
    NotModified,
}

/// A fetched document with its caching headers
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse<T> {
    /// Document or not-modified marker
    pub state: ResourceState<T>,
    /// `Content-Type` of a fresh document
    pub content_type: Option<String>,
    /// `Last-Modified`
    pub last_modified: Option<DateTime<Utc>>,
    /// `Expires`
    pub expires: Option<DateTime<Utc>>,
}

impl<T> ResourceResponse<T> {
    /// Document, when one was returned
    pub fn document(&self) -> Option<&T> {
        match &self.state {
            ResourceState::Document(document) => Some(document),
            ResourceState::NotModified => None,
        }
    }

    /// Did the server answer 304
    pub fn is_not_modified(&self) -> bool {
        matches!(self.state, ResourceState::NotModified)
    }

    /// Read a 200/304 document response
    pub fn from_response(
        response: &Response,
        decode: impl FnOnce(&[u8]) -> PaymentResult<T>,
    ) -> PaymentResult<Self> {
        let status = response.status().as_u16();
        match status {
            200 | 304 => {
                let last_modified = response.header("last-modified").and_then(parse_http_date);
                let expires = response.header("expires").and_then(parse_http_date);
                let (state, content_type) = if status == 200 {
                    (
                        ResourceState::Document(decode(response.bytes())?),
                        response.content_type().map(str::to_string),
                    )
                } else {
                    (ResourceState::NotModified, None)
                };
                Ok(Self {
                    state,
                    content_type,
                    last_modified,
                    expires,
                })
            }
            404 => Err(PaymentError::ResourceNotFound {
                url: response.url().to_string(),
            }),
            _ => {
                warn!(status, url = %response.url(), "Unexpected document response");
                Err(PaymentError::protocol(response))
            }
        }
    }
}

/// Fetch the form of a merchant by its showcase id
#[derive(Debug, Clone)]
pub struct FetchShowcase {
    scid: u64,
    if_modified_since: Option<DateTime<Utc>>,
    params: ParameterMap,
}

impl FetchShowcase {
    /// Unconditional fetch
    pub fn new(scid: u64) -> Self {
        Self {
            scid,
            if_modified_since: None,
            params: ParameterMap::new(),
        }
    }

    /// Only return a body when it changed after `instant`
    pub fn if_modified_since(mut self, instant: DateTime<Utc>) -> Self {
        self.if_modified_since = Some(instant);
        self
    }

    /// Showcase id
    pub fn scid(&self) -> u64 {
        self.scid
    }
}

impl ApiRequest for FetchShowcase {
    type Output = ResourceResponse<Showcase>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn url(&self, hosts: &Hosts) -> String {
        hosts.money_api_url(&format!("showcase/{}", self.scid))
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.if_modified_since
            .iter()
            .map(|instant| ("If-Modified-Since".to_string(), format_http_date(instant)))
            .collect()
    }

    fn parameters(&self) -> &ParameterMap {
        &self.params
    }

    fn parse(self, response: Response) -> PaymentResult<Self::Output> {
        ResourceResponse::from_response(&response, Showcase::from_json)
    }
}
