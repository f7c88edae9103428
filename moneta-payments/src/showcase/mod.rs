//! Server-described payment forms
//!
//! A [`Showcase`] is a tree of [`Component`]s plus hidden fields. The UI
//! fills leaf values, checks [`Showcase::is_valid`], and submits
//! [`Showcase::payment_parameters`] through a [`ShowcaseContext`].

mod component;
mod context;
mod control;
mod document;
mod fetch;
mod group;
mod select;

pub use component::Component;
pub use context::{ShowcaseContext, ShowcaseState, Step, StepOutcome, SubmitStep};
pub use control::{Control, ControlBuilder, ControlKind, LengthLimits, NumberRange, Pattern};
pub use fetch::{FetchShowcase, ResourceResponse, ResourceState};
pub use group::{Group, GroupBuilder, Layout};
pub use select::{Select, SelectBuilder, SelectOption, SelectStyle};

use crate::params::ParameterMap;
use serde::{Deserialize, Serialize};

/// Funding instruments a form accepts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllowedMoneySource {
    /// Wallet balance
    Wallet,
    /// Cards linked to the wallet
    Cards,
    /// Any bank card
    PaymentCard,
    /// Cash
    Cash,
    /// A source this client does not know
    #[serde(other)]
    Unknown,
}

/// Server message attached to a field of a returned form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseError {
    /// Field the message refers to
    pub name: String,
    /// Message for the user
    pub alert: String,
}

/// A payment form document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "document::ShowcaseDocument")]
pub struct Showcase {
    /// Form title
    pub title: String,
    /// Values sent with every submission, never shown
    pub hidden_fields: ParameterMap,
    /// Visible fields
    pub form: Group,
    /// Accepted funding instruments
    pub money_sources: Vec<AllowedMoneySource>,
    /// Field messages from the last submission
    pub errors: Vec<ShowcaseError>,
}

impl Showcase {
    /// Form with the given fields and nothing else
    pub fn new(title: impl Into<String>, form: Group) -> Self {
        Self {
            title: title.into(),
            form,
            ..Default::default()
        }
    }

    /// Add a hidden field
    pub fn with_hidden_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.hidden_fields.insert(name, value);
        self
    }

    /// Are the visible fields valid
    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    /// Hidden fields, then the flattened form; form values win on clashes
    pub fn payment_parameters(&self) -> ParameterMap {
        let mut params = self.hidden_fields.clone();
        self.form.fill_parameters(&mut params);
        params
    }

    /// Parse a form document, keeping component construction failures distinct
    pub fn from_json(bytes: &[u8]) -> crate::error::PaymentResult<Self> {
        let document: document::ShowcaseDocument = serde_json::from_slice(bytes)?;
        Self::try_from(document)
    }
}
