//! Persistable snapshots of a payment process

use super::ProcessState;
use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Progress of a payment process: its results and state
///
/// Which results are present depends on the state: none at `Created`, the
/// request result at `Started`, both at `Processing` and `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedState<R, P> {
    request_payment: Option<R>,
    process_payment: Option<P>,
    state: ProcessState,
}

impl<R, P> SavedState<R, P> {
    /// Create a snapshot, rejecting result sets that do not fit the state
    pub fn new(
        request_payment: Option<R>,
        process_payment: Option<P>,
        state: ProcessState,
    ) -> PaymentResult<Self> {
        let (request_expected, process_expected) = match state {
            ProcessState::Created => (false, false),
            ProcessState::Started => (true, false),
            ProcessState::Processing | ProcessState::Completed => (true, true),
        };

        if request_payment.is_some() != request_expected {
            return Err(PaymentError::InvalidState(format!(
                "request payment must be {} in state {:?}",
                presence(request_expected),
                state
            )));
        }
        if process_payment.is_some() != process_expected {
            return Err(PaymentError::InvalidState(format!(
                "process payment must be {} in state {:?}",
                presence(process_expected),
                state
            )));
        }

        Ok(Self {
            request_payment,
            process_payment,
            state,
        })
    }

    /// Create a snapshot from a compact state code
    pub fn from_flags(
        request_payment: Option<R>,
        process_payment: Option<P>,
        flags: i32,
    ) -> PaymentResult<Self> {
        Self::new(request_payment, process_payment, parse_flags(flags)?)
    }

    /// Compact state code
    pub fn flags(&self) -> i32 {
        self.state.ordinal() as i32
    }

    /// Process state
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Last "request payment" result
    pub fn request_payment(&self) -> Option<&R> {
        self.request_payment.as_ref()
    }

    /// Last "process payment" result
    pub fn process_payment(&self) -> Option<&P> {
        self.process_payment.as_ref()
    }

    /// Split into results and state
    pub fn into_parts(self) -> (Option<R>, Option<P>, ProcessState) {
        (self.request_payment, self.process_payment, self.state)
    }

    // Callers guarantee the presence rules.
    pub(super) fn from_parts_unchecked(
        request_payment: Option<R>,
        process_payment: Option<P>,
        state: ProcessState,
    ) -> Self {
        Self {
            request_payment,
            process_payment,
            state,
        }
    }
}

fn presence(expected: bool) -> &'static str {
    if expected { "present" } else { "absent" }
}

fn parse_flags(flags: i32) -> PaymentResult<ProcessState> {
    if flags < 0 {
        return Err(PaymentError::InvalidState(format!("invalid flags: {}", flags)));
    }
    u8::try_from(flags % 10)
        .ok()
        .and_then(ProcessState::from_ordinal)
        .ok_or_else(|| PaymentError::InvalidState(format!("invalid flags: {}", flags)))
}

/// Serializable form of a [`SavedState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStateRecord<R, P> {
    /// Last "request payment" result
    #[serde(default)]
    pub request_payment: Option<R>,
    /// Last "process payment" result
    #[serde(default)]
    pub process_payment: Option<P>,
    /// Compact state code
    pub flags: i32,
}

impl<R, P> From<SavedState<R, P>> for SavedStateRecord<R, P> {
    fn from(state: SavedState<R, P>) -> Self {
        let flags = state.flags();
        let (request_payment, process_payment, _) = state.into_parts();
        Self {
            request_payment,
            process_payment,
            flags,
        }
    }
}

impl<R, P> TryFrom<SavedStateRecord<R, P>> for SavedState<R, P> {
    type Error = PaymentError;

    fn try_from(record: SavedStateRecord<R, P>) -> PaymentResult<Self> {
        Self::from_flags(record.request_payment, record.process_payment, record.flags)
    }
}
