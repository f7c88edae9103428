//! Payment process state machine
//!
//! A payment is two calls: "request payment" reserves it and "process
//! payment" carries it out. Processing may be asynchronous on the server,
//! so the process call is repeated with the same request while the server
//! reports it as pending.
//!
//! ```text
//! Created --request--> Started --process--> Processing --poll--> Completed
//!                                    \_______________________________^
//! ```

mod external;
mod saved_state;

pub use external::{
    ExternalPaymentFlow, ExternalPaymentParameters, ParameterProvider, ProcessExternalPaymentCall,
    RequestExternalPaymentCall,
};
pub use saved_state::{SavedState, SavedStateRecord};

use crate::{
    error::{PaymentError, PaymentResult},
    types::{ProcessExternalPayment, ProcessStatus, RequestExternalPayment, RequestStatus},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Where a payment process stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Nothing sent yet
    #[default]
    Created,
    /// Payment requested
    Started,
    /// Processing needs another call
    Processing,
    /// Processing reached a final status
    Completed,
}

impl ProcessState {
    /// Position in declaration order
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Started => 1,
            Self::Processing => 2,
            Self::Completed => 3,
        }
    }

    /// Inverse of [`ProcessState::ordinal`]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Created),
            1 => Some(Self::Started),
            2 => Some(Self::Processing),
            3 => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Result of a "request payment" call
pub trait RequestOutcome {
    /// Outcome reported by the server
    fn status(&self) -> RequestStatus;
}

/// Result of a "process payment" call
pub trait ProcessOutcome {
    /// Outcome reported by the server
    fn status(&self) -> ProcessStatus;

    /// Delay before polling again
    fn next_retry(&self) -> Duration;
}

impl RequestOutcome for RequestExternalPayment {
    fn status(&self) -> RequestStatus {
        self.status
    }
}

impl ProcessOutcome for ProcessExternalPayment {
    fn status(&self) -> ProcessStatus {
        self.status
    }

    fn next_retry(&self) -> Duration {
        ProcessExternalPayment::next_retry(self)
    }
}

/// The two calls a payment process drives
#[async_trait]
pub trait PaymentFlow: Send + Sync {
    /// "Request payment" result
    type Request: RequestOutcome + Clone + Send + Sync;
    /// "Process payment" result
    type Process: ProcessOutcome + Clone + Send + Sync;

    /// Reserve the payment
    async fn request_payment(&self) -> PaymentResult<Self::Request>;

    /// Carry out the payment reserved by `request`
    async fn process_payment(&self, request: &Self::Request) -> PaymentResult<Self::Process>;

    /// Process call used when resuming a pending payment
    async fn repeat_process_payment(
        &self,
        request: &Self::Request,
    ) -> PaymentResult<Self::Process> {
        self.process_payment(request).await
    }
}

/// Drives a [`PaymentFlow`] to a final status
pub struct PaymentProcess<F: PaymentFlow> {
    flow: F,
    request_payment: Option<F::Request>,
    process_payment: Option<F::Process>,
    state: ProcessState,
}

impl<F: PaymentFlow> PaymentProcess<F> {
    /// Create a process in the `Created` state
    pub fn new(flow: F) -> Self {
        Self {
            flow,
            request_payment: None,
            process_payment: None,
            state: ProcessState::Created,
        }
    }

    /// Advance one step; returns whether the process is completed
    ///
    /// From `Started` or `Processing` this keeps polling while the server
    /// reports the payment as pending, sleeping for the suggested delay
    /// between calls.
    pub async fn proceed(&mut self) -> PaymentResult<bool> {
        match self.state {
            ProcessState::Created => self.execute_request_payment().await?,
            ProcessState::Started => self.execute_process_payment(false).await?,
            ProcessState::Processing => self.execute_process_payment(true).await?,
            ProcessState::Completed => {}
        }
        Ok(self.is_completed())
    }

    /// Re-issue the call that led to the current state
    ///
    /// Used after an external interruption, such as returning from an
    /// external authorization page.
    pub async fn repeat(&mut self) -> PaymentResult<bool> {
        match self.state {
            ProcessState::Created => {}
            ProcessState::Started => self.execute_request_payment().await?,
            ProcessState::Processing => self.execute_process_payment(false).await?,
            ProcessState::Completed => self.execute_process_payment(true).await?,
        }
        Ok(self.is_completed())
    }

    /// Return to `Created`, dropping both results
    pub fn reset(&mut self) {
        self.request_payment = None;
        self.process_payment = None;
        self.state = ProcessState::Created;
    }

    /// Current state
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Is the process in `Completed`
    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Completed
    }

    /// Last "request payment" result
    pub fn request_payment(&self) -> Option<&F::Request> {
        self.request_payment.as_ref()
    }

    /// Last "process payment" result
    pub fn process_payment(&self) -> Option<&F::Process> {
        self.process_payment.as_ref()
    }

    /// The flow being driven
    pub fn flow(&self) -> &F {
        &self.flow
    }

    /// Mutable flow, e.g. to change credentials
    pub fn flow_mut(&mut self) -> &mut F {
        &mut self.flow
    }

    /// Snapshot of the current progress
    pub fn saved_state(&self) -> SavedState<F::Request, F::Process> {
        SavedState::from_parts_unchecked(
            self.request_payment.clone(),
            self.process_payment.clone(),
            self.state,
        )
    }

    /// Continue from a snapshot
    pub fn restore_saved_state(&mut self, saved: SavedState<F::Request, F::Process>) {
        let (request_payment, process_payment, state) = saved.into_parts();
        self.request_payment = request_payment;
        self.process_payment = process_payment;
        self.state = state;
        debug!(state = ?self.state, "Payment process restored");
    }

    async fn execute_request_payment(&mut self) -> PaymentResult<()> {
        let result = self.flow.request_payment().await?;
        debug!(status = ?result.status(), "Payment requested");
        self.request_payment = Some(result);
        self.state = ProcessState::Started;
        Ok(())
    }

    /// Run process payment until it settles.
    ///
    /// State and result are written only once the loop ends successfully; a
    /// failed poll leaves the process as it was before the call.
    async fn execute_process_payment(&mut self, repeat: bool) -> PaymentResult<()> {
        let request = self.request_payment.as_ref().ok_or_else(|| {
            PaymentError::InvalidState(format!("no request payment in state {:?}", self.state))
        })?;
        let mut previous = self.process_payment.as_ref().map(ProcessOutcome::status);
        let mut attempt = 0u32;

        let (result, state) = loop {
            attempt += 1;
            let result = if repeat {
                self.flow.repeat_process_payment(request).await?
            } else {
                self.flow.process_payment(request).await?
            };
            let status = result.status();
            debug!(attempt, status = ?status, "Payment processed");

            if status == ProcessStatus::ExtAuthRequired
                && previous != Some(ProcessStatus::ExtAuthRequired)
            {
                break (result, ProcessState::Processing);
            }
            if !status.is_pending() {
                break (result, ProcessState::Completed);
            }

            let delay = result.next_retry();
            debug!(?delay, "Payment pending, polling again");
            tokio::time::sleep(delay).await;
            previous = Some(status);
        };

        self.process_payment = Some(result);
        self.state = state;
        Ok(())
    }
}
