//! Background payment processing simulator.
//!
//! Emulates a real gateway's latency and failure modes: after a payment is
//! created, a fire-and-forget task drives it from Pending through Processing
//! to Completed or Failed, with randomized delays and a policy-driven
//! failure draw. Nothing in the creation path waits on this work.

mod config;
mod outcome;
mod processor;

pub use config::SimulatorConfig;
pub use outcome::{FAILURE_REASONS, Outcome, failure_rate};
pub use processor::ProcessingSimulator;
