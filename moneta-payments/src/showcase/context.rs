//! Step-by-step form submission
//!
//! The server answers each submission with a status code that decides the
//! next wizard state:
//!
//! | status | state           | effect                                  |
//! |--------|-----------------|-----------------------------------------|
//! | 200    | `Completed`     | resolved parameters taken from the body |
//! | 300    | `HasNextStep`   | current step pushed, new step current   |
//! | 400    | `InvalidParams` | current step replaced                   |
//! | 404    | unchanged       | [`PaymentError::ResourceNotFound`]      |
//! | other  | unchanged       | [`PaymentError::Protocol`]              |

use super::{
    Showcase,
    fetch::{ResourceResponse, ResourceState},
};
use crate::{
    api::{ApiClient, ApiRequest},
    config::Hosts,
    error::{PaymentError, PaymentResult},
    params::ParameterMap,
    time::{Clock, format_http_date},
};
use chrono::{DateTime, Utc};
use moneta_http::{Method, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where the wizard stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowcaseState {
    /// Another form must be filled
    HasNextStep,
    /// The server returned the form with corrections
    InvalidParams,
    /// Parameters are resolved
    Completed,
    /// The cached form is still current
    NotModified,
    /// Nothing submitted yet
    #[default]
    Unknown,
}

/// A form and the endpoint its values go to
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The form
    pub showcase: Showcase,
    /// Submission endpoint
    pub submit_url: String,
}

impl Step {
    /// Create a step
    pub fn new(showcase: Showcase, submit_url: impl Into<String>) -> Self {
        Self {
            showcase,
            submit_url: submit_url.into(),
        }
    }
}

/// What a submission produced, before it is applied to a context
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Final parameters (200)
    Completed(ParameterMap),
    /// A further form (300)
    NextStep(Step),
    /// The same form with corrections (400)
    InvalidParams(Step),
}

/// Wizard over server-described forms
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseContext {
    history: Vec<Step>,
    last_modified: DateTime<Utc>,
    current_step: Option<Step>,
    params: ParameterMap,
    state: ShowcaseState,
}

impl ShowcaseContext {
    /// Start a wizard at a freshly loaded form
    pub fn new(showcase: Showcase, submit_url: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            history: Vec::new(),
            last_modified,
            current_step: Some(Step::new(showcase, submit_url)),
            params: ParameterMap::new(),
            state: ShowcaseState::Unknown,
        }
    }

    /// A context without a form, e.g. for a cached form that did not change
    pub fn with_state(state: ShowcaseState, clock: &dyn Clock) -> Self {
        Self {
            history: Vec::new(),
            last_modified: clock.now(),
            current_step: None,
            params: ParameterMap::new(),
            state,
        }
    }

    /// Rebuild a context from its parts
    pub fn restore(
        history: Vec<Step>,
        last_modified: DateTime<Utc>,
        current_step: Option<Step>,
        params: ParameterMap,
        state: ShowcaseState,
    ) -> Self {
        Self {
            history,
            last_modified,
            current_step,
            params,
            state,
        }
    }

    /// Build a context from a form fetch
    ///
    /// A fresh document starts a wizard at it; an unchanged one yields a
    /// step-less context in the `NotModified` state.
    pub fn from_resource(
        resource: ResourceResponse<Showcase>,
        submit_url: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        let last_modified = resource.last_modified.unwrap_or_else(|| clock.now());
        match resource.state {
            ResourceState::Document(showcase) => Self::new(showcase, submit_url, last_modified),
            ResourceState::NotModified => {
                let mut context = Self::with_state(ShowcaseState::NotModified, clock);
                context.last_modified = last_modified;
                context
            }
        }
    }

    /// Request submitting the current step's parameters
    pub fn create_request(&self) -> PaymentResult<SubmitStep> {
        let step = self.current_step.as_ref().ok_or_else(|| {
            PaymentError::InvalidRequest("showcase context has no current step".to_string())
        })?;
        if step.submit_url.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "current step has no submit url".to_string(),
            ));
        }

        Ok(SubmitStep {
            submit_url: step.submit_url.clone(),
            params: step.showcase.payment_parameters(),
            if_modified_since: self.last_modified,
        })
    }

    /// Apply a submission outcome
    pub fn apply(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Completed(params) => {
                self.params = params;
                self.state = ShowcaseState::Completed;
            }
            StepOutcome::NextStep(step) => {
                if let Some(current) = self.current_step.replace(step) {
                    self.history.push(current);
                }
                self.state = ShowcaseState::HasNextStep;
            }
            StepOutcome::InvalidParams(step) => {
                self.current_step = Some(step);
                self.state = ShowcaseState::InvalidParams;
            }
        }
        debug!(state = ?self.state, history = self.history.len(), "Showcase step applied");
    }

    /// Submit the current step and advance
    ///
    /// On failure the context is left as it was.
    pub async fn submit(&mut self, client: &ApiClient) -> PaymentResult<ShowcaseState> {
        let request = self.create_request()?;
        let outcome = client.execute(request).await?;
        self.apply(outcome);
        Ok(self.state)
    }

    /// Step back
    ///
    /// A completed wizard drops its resolved parameters and returns to
    /// `HasNextStep` without touching history. Otherwise the most recent
    /// history entry becomes current. With neither, nothing changes.
    pub fn pop_step(&mut self) -> Option<&Step> {
        if !self.params.is_empty() {
            self.params.clear();
            self.state = ShowcaseState::HasNextStep;
        } else if let Some(step) = self.history.pop() {
            self.current_step = Some(step);
        }
        self.current_step.as_ref()
    }

    /// Number of steps that can be popped
    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Earlier steps, oldest first
    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// Step being filled
    pub fn current_step(&self) -> Option<&Step> {
        self.current_step.as_ref()
    }

    /// Mutable step being filled
    pub fn current_step_mut(&mut self) -> Option<&mut Step> {
        self.current_step.as_mut()
    }

    /// Timestamp sent as `If-Modified-Since`
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Resolved parameters, empty until completion
    pub fn params(&self) -> &ParameterMap {
        &self.params
    }

    /// Wizard state
    pub fn state(&self) -> ShowcaseState {
        self.state
    }
}

/// Submission of one step
#[derive(Debug, Clone)]
pub struct SubmitStep {
    submit_url: String,
    params: ParameterMap,
    if_modified_since: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ResolvedParams {
    params: ParameterMap,
}

impl SubmitStep {
    fn next_step(response: &Response) -> PaymentResult<Step> {
        let location = response.header("location").ok_or_else(|| {
            warn!(status = %response.status(), url = %response.url(), "Form step without Location");
            PaymentError::Protocol {
                status: response.status().as_u16(),
                url: response.url().to_string(),
                message: "missing Location header".to_string(),
            }
        })?;
        let submit_url = response
            .url()
            .join(location)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| location.to_string());

        let showcase = Showcase::from_json(response.bytes())?;
        Ok(Step::new(showcase, submit_url))
    }
}

impl ApiRequest for SubmitStep {
    type Output = StepOutcome;

    fn method(&self) -> Method {
        Method::POST
    }

    fn url(&self, hosts: &Hosts) -> String {
        if self.submit_url.starts_with("http://") || self.submit_url.starts_with("https://") {
            self.submit_url.clone()
        } else {
            format!(
                "{}/{}",
                hosts.web.trim_end_matches('/'),
                self.submit_url.trim_start_matches('/')
            )
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![(
            "If-Modified-Since".to_string(),
            format_http_date(&self.if_modified_since),
        )]
    }

    fn parameters(&self) -> &ParameterMap {
        &self.params
    }

    fn parse(self, response: Response) -> PaymentResult<StepOutcome> {
        match response.status().as_u16() {
            200 => {
                let resolved: ResolvedParams = serde_json::from_slice(response.bytes())?;
                Ok(StepOutcome::Completed(resolved.params))
            }
            300 => Ok(StepOutcome::NextStep(Self::next_step(&response)?)),
            400 => Ok(StepOutcome::InvalidParams(Self::next_step(&response)?)),
            404 => Err(PaymentError::ResourceNotFound {
                url: response.url().to_string(),
            }),
            _ => {
                warn!(status = %response.status(), url = %response.url(), "Unexpected form submission response");
                Err(PaymentError::protocol(&response))
            }
        }
    }
}
