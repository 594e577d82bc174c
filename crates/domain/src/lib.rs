//! Payment domain model.
//!
//! Defines the payment entity, its status state machine and the commands
//! that mutate it. Persistence and orchestration live in other crates.

mod error;
pub mod payment;

pub use error::PaymentError;
pub use payment::{
    CreatePayment, Metadata, Payment, PaymentMethod, PaymentStatus, UpdatePayment,
};
