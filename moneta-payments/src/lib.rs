//! Payment submission engine for the moneta SDK
//!
//! Walks server-described payment forms to a resolved parameter set and
//! drives the resulting payment through request, processing and polling.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Payment Submission                          │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │                     Showcase forms                        │  │
//! │  │  Group ─ Control | Select ─ option groups                │  │
//! │  │  is_valid() | payment_parameters()                        │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                            │                                    │
//! │                            ▼                                    │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │                    ShowcaseContext                        │  │
//! │  │  200 Completed | 300 HasNextStep | 400 InvalidParams      │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                            │ ParameterMap                       │
//! │                            ▼                                    │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │                    PaymentProcess                         │  │
//! │  │  Created → Started → Processing ⟲ → Completed             │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moneta_payments::prelude::*;
//! use moneta_http::{HttpClient, HttpClientConfig};
//! use std::sync::Arc;
//!
//! let transport = Arc::new(HttpClient::new(HttpClientConfig::default())?);
//! let client = ApiClient::new(transport, ClientConfig::from_env()?);
//!
//! // Load the merchant form and walk it to completion
//! let resource = client.execute(FetchShowcase::new(923)).await?;
//! let mut context = ShowcaseContext::from_resource(resource, submit_url, &SystemClock);
//! if let Some(step) = context.current_step_mut() {
//!     step.showcase.form.set_value("sum", "100");
//! }
//! while context.submit(&client).await? != ShowcaseState::Completed {
//!     // fill the next form
//! }
//!
//! // Pay with a bank card
//! let parameters = ExternalPaymentParameters {
//!     pattern_id: "923".into(),
//!     payment_parameters: context.params().clone(),
//!     ..Default::default()
//! };
//! let mut process = PaymentProcess::new(ExternalPaymentFlow::from_config(client, parameters)?);
//! while !process.proceed().await? {
//!     // send the payer to `acs_uri`, then call `proceed()` again
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod money;
pub mod params;
pub mod process;
pub mod showcase;
pub mod time;
pub mod types;

pub use api::{ApiClient, ApiRequest, parse_json_response};
pub use config::{ClientConfig, ClientConfigBuilder, Hosts};
pub use error::{PaymentError, PaymentResult};
pub use money::Currency;
pub use params::ParameterMap;
pub use process::{
    ExternalPaymentFlow, ExternalPaymentParameters, ParameterProvider, PaymentFlow,
    PaymentProcess, ProcessOutcome, ProcessState, RequestOutcome, SavedState, SavedStateRecord,
};
pub use showcase::{
    AllowedMoneySource, Component, Control, ControlKind, FetchShowcase, Group, Layout,
    NumberRange, ResourceResponse, ResourceState, Select, SelectOption, Showcase,
    ShowcaseContext, ShowcaseError, ShowcaseState, Step,
};
pub use time::{Clock, SystemClock};
pub use types::{
    ExternalCard, MoneySource, ProcessExternalPayment, ProcessStatus, RequestExternalPayment,
    RequestStatus,
};

/// Prelude for common imports.
///
/// ```
/// use moneta_payments::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{ApiClient, ApiRequest};
    pub use crate::config::ClientConfig;
    pub use crate::error::{PaymentError, PaymentResult};
    pub use crate::params::ParameterMap;
    pub use crate::process::{
        ExternalPaymentFlow, ExternalPaymentParameters, PaymentFlow, PaymentProcess,
        ProcessState,
    };
    pub use crate::showcase::{
        Component, Control, ControlKind, FetchShowcase, Group, Layout, Select, Showcase,
        ShowcaseContext, ShowcaseState,
    };
    pub use crate::time::SystemClock;
    pub use crate::types::ProcessStatus;
}
