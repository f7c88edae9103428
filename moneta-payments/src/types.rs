//! Payment method responses

use crate::params::ParameterMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poll delay used when the server does not suggest one
pub const DEFAULT_NEXT_RETRY: Duration = Duration::from_secs(5);

/// Outcome of a "request payment" call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Payment can be processed
    Success,
    /// Payment was refused; see the error code
    Refused,
    /// Transfer waits for the recipient to claim it
    HoldForPickup,
    /// A status this client does not know
    #[default]
    #[serde(other)]
    Unknown,
}

/// Outcome of a "process payment" call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Payment completed
    Success,
    /// Payment was refused
    Refused,
    /// Still running; poll again after `next_retry`
    InProgress,
    /// Payer must pass an external authorization such as 3-D Secure
    ExtAuthRequired,
    /// Transfer waits for the recipient to claim it
    HoldForPickup,
    /// A status this client does not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl ProcessStatus {
    /// Will polling again change the outcome
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::InProgress | Self::ExtAuthRequired)
    }
}

/// Bank card saved for external payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCard {
    /// Card brand, e.g. `VISA`
    #[serde(default)]
    pub payment_card_type: Option<String>,
    /// Masked card number
    #[serde(default)]
    pub pan_fragment: Option<String>,
    /// Token that stands in for the card
    pub money_source_token: String,
}

/// Funding instrument chosen for a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MoneySource {
    /// Wallet balance
    Wallet,
    /// A saved bank card
    PaymentCard(ExternalCard),
}

/// Answer to `request-external-payment`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestExternalPayment {
    /// Outcome
    pub status: RequestStatus,
    /// Error code when refused
    #[serde(default)]
    pub error: Option<String>,
    /// Identifier to pass to every processing call
    #[serde(default)]
    pub request_id: Option<String>,
    /// Amount that will be charged
    #[serde(default)]
    pub contract_amount: Option<Decimal>,
    /// Payment title
    #[serde(default)]
    pub title: Option<String>,
}

/// Answer to `process-external-payment`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessExternalPayment {
    /// Outcome
    pub status: ProcessStatus,
    /// Error code when refused
    #[serde(default)]
    pub error: Option<String>,
    /// Invoice of a completed payment
    #[serde(default)]
    pub invoice_id: Option<String>,
    /// Page for external authorization
    #[serde(default)]
    pub acs_uri: Option<String>,
    /// Form fields to post to `acs_uri`
    #[serde(default)]
    pub acs_params: ParameterMap,
    /// Suggested poll delay in milliseconds
    #[serde(default)]
    pub next_retry: Option<u64>,
    /// Card saved on the payer's request
    #[serde(default)]
    pub money_source: Option<ExternalCard>,
}

impl ProcessExternalPayment {
    /// Poll delay, falling back to [`DEFAULT_NEXT_RETRY`]
    pub fn next_retry(&self) -> Duration {
        self.next_retry
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_NEXT_RETRY)
    }
}
