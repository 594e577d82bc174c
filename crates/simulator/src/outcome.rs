//! Outcome policy: failure rate computation and the random draw.

use domain::{Payment, PaymentMethod};
use rand::Rng;

use crate::config::SimulatorConfig;

/// The fixed set of human-readable decline causes.
pub const FAILURE_REASONS: [&str; 6] = [
    "Insufficient funds",
    "Card declined",
    "Invalid card number",
    "Expired card",
    "Network timeout",
    "Fraud detection flagged the transaction",
];

/// Message merged into metadata when a payment is approved.
pub(crate) const APPROVAL_MESSAGE: &str = "Payment approved by gateway";

/// Result of a simulated processing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Approved { transaction_id: String },
    Declined { reason: &'static str },
}

/// Computes the failure probability for `payment` under `config`.
///
/// Base rate, plus a penalty above the amount threshold, plus a penalty for
/// credit cards, capped.
pub fn failure_rate(payment: &Payment, config: &SimulatorConfig) -> f64 {
    let mut rate = config.base_failure_rate;
    if payment.amount() > config.large_amount_threshold {
        rate += config.large_amount_penalty;
    }
    if payment.payment_method() == PaymentMethod::CreditCard {
        rate += config.credit_card_penalty;
    }
    rate.min(config.failure_rate_cap)
}

/// Draws a processing outcome for `payment`.
pub fn draw_outcome(payment: &Payment, config: &SimulatorConfig) -> Outcome {
    let rate = failure_rate(payment, config);
    let mut rng = rand::thread_rng();

    if rng.r#gen::<f64>() < rate {
        let reason = FAILURE_REASONS[rng.gen_range(0..FAILURE_REASONS.len())];
        Outcome::Declined { reason }
    } else {
        Outcome::Approved {
            transaction_id: format!("txn_{}", uuid::Uuid::new_v4().simple()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CreatePayment, Metadata};

    fn make_payment(amount: i64, method: PaymentMethod) -> Payment {
        Payment::new(CreatePayment {
            amount,
            currency: "USD".to_string(),
            payment_method: method,
            customer_id: "c1".to_string(),
            description: None,
            metadata: Metadata::new(),
        })
    }

    #[test]
    fn test_base_rate_for_small_bank_transfer() {
        let config = SimulatorConfig::default();
        let payment = make_payment(500, PaymentMethod::BankTransfer);
        assert_eq!(failure_rate(&payment, &config), 0.10);
    }

    #[test]
    fn test_large_amount_adds_penalty() {
        let config = SimulatorConfig::default();
        let payment = make_payment(10_001, PaymentMethod::BankTransfer);
        assert_eq!(failure_rate(&payment, &config), 0.20);
    }

    #[test]
    fn test_threshold_amount_is_not_large() {
        let config = SimulatorConfig::default();
        let payment = make_payment(10_000, PaymentMethod::BankTransfer);
        assert_eq!(failure_rate(&payment, &config), 0.10);
    }

    #[test]
    fn test_credit_card_adds_penalty() {
        let config = SimulatorConfig::default();
        let payment = make_payment(500, PaymentMethod::CreditCard);
        assert!((failure_rate(&payment, &config) - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rate_is_capped() {
        let mut config = SimulatorConfig::default();
        config.base_failure_rate = 0.45;
        let payment = make_payment(50_000, PaymentMethod::CreditCard);
        assert_eq!(failure_rate(&payment, &config), 0.50);
    }

    #[test]
    fn test_forced_decline_draws_a_known_reason() {
        let config = SimulatorConfig::default().always_decline();
        let payment = make_payment(500, PaymentMethod::DebitCard);

        match draw_outcome(&payment, &config) {
            Outcome::Declined { reason } => assert!(FAILURE_REASONS.contains(&reason)),
            Outcome::Approved { .. } => panic!("rate 1.0 must decline"),
        }
    }

    #[test]
    fn test_forced_approval_generates_transaction_id() {
        let config = SimulatorConfig::default().always_approve();
        let payment = make_payment(500, PaymentMethod::DebitCard);

        match draw_outcome(&payment, &config) {
            Outcome::Approved { transaction_id } => {
                assert!(transaction_id.starts_with("txn_"));
            }
            Outcome::Declined { .. } => panic!("rate 0.0 must approve"),
        }
    }
}
