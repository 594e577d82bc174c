//! Shared types for the payment platform.

mod types;

pub use types::PaymentId;
