//! Service error types.

use common::PaymentId;
use domain::PaymentError;
use thiserror::Error;

/// Errors surfaced by synchronous service operations.
///
/// Persistence failures never appear here: the store logs and swallows them
/// by design. The simulator's asynchronous path has no caller to fail.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No payment exists with the given id.
    #[error("Payment not found: {0}")]
    NotFound(PaymentId),

    /// The requested mutation violates the payment's state machine.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
