//! Domain error types.

use thiserror::Error;

use crate::payment::PaymentStatus;

/// Errors that can occur when mutating a payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The requested status change is not a legal edge of the state machine.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// A status string could not be parsed.
    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),
}
