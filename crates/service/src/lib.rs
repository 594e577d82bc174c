//! Payment orchestration.
//!
//! [`PaymentService`] ties the store and the processing simulator together:
//! creation stores the entity and schedules background processing without
//! waiting on it, updates are validated against the status state machine,
//! and reads come back wrapped in a pagination envelope.

mod error;
mod page;
mod payments;

pub use error::ServiceError;
pub use page::Page;
pub use payments::{ListParams, PaymentService};
