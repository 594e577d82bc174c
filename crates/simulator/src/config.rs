//! Simulator policy knobs.

use std::time::Duration;

/// Tunable policy for the processing simulator.
///
/// The delay window and failure rates are policy, not correctness: tests
/// shrink the window to zero and pin the rates to force an outcome.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Lower bound of each randomized wait.
    pub min_delay: Duration,

    /// Upper bound of each randomized wait.
    pub max_delay: Duration,

    /// Failure probability applied to every payment.
    pub base_failure_rate: f64,

    /// Amount (smallest currency unit) above which payments are riskier.
    pub large_amount_threshold: i64,

    /// Added to the failure rate above the amount threshold.
    pub large_amount_penalty: f64,

    /// Added to the failure rate for credit card payments.
    pub credit_card_penalty: f64,

    /// Ceiling on the combined failure rate.
    pub failure_rate_cap: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
            base_failure_rate: 0.10,
            large_amount_threshold: 10_000,
            large_amount_penalty: 0.10,
            credit_card_penalty: 0.05,
            failure_rate_cap: 0.50,
        }
    }
}

impl SimulatorConfig {
    /// A config with no delays, for deterministic tests.
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Pins the failure draw to never fail.
    pub fn always_approve(mut self) -> Self {
        self.base_failure_rate = 0.0;
        self.large_amount_penalty = 0.0;
        self.credit_card_penalty = 0.0;
        self
    }

    /// Pins the failure draw to always fail.
    pub fn always_decline(mut self) -> Self {
        self.base_failure_rate = 1.0;
        self.failure_rate_cap = 1.0;
        self
    }
}
