//! Payment status state machine.

use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// The status of a payment in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Processing ──┬──► Completed ──► Refunded
///           │                 │
///           │                 └──► Failed ──► Pending (retry)
///           └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment was created and is waiting to be processed.
    #[default]
    Pending,

    /// The gateway picked the payment up and is working on it.
    Processing,

    /// Processing succeeded. Refund is the only remaining transition.
    Completed,

    /// Processing failed. The payment may be retried back to Pending.
    Failed,

    /// Cancelled before processing started (terminal state).
    Cancelled,

    /// A completed payment that was refunded (terminal state).
    Refunded,
}

impl PaymentStatus {
    /// Returns true if the state machine allows moving to `next` from here.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Refunded)
                | (Failed, Pending)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Cancelled | PaymentStatus::Refunded)
    }

    /// Returns true if this status marks the end of a processing attempt.
    ///
    /// Reaching one of these for the first time stamps `processed_at`.
    pub fn is_processing_outcome(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// Parses a status from its string form, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, PaymentError> {
        let all = [
            PaymentStatus::Pending,
            PaymentStatus::Processing,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Cancelled,
            PaymentStatus::Refunded,
        ];
        all.into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PaymentError::UnknownStatus(s.to_string()))
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
