//! Commands mutating payments.

use super::{Metadata, PaymentMethod, PaymentStatus};

/// Command to create a new payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    /// Amount in the smallest currency unit.
    pub amount: i64,

    /// Short currency code, e.g. "USD".
    pub currency: String,

    pub payment_method: PaymentMethod,

    pub customer_id: String,

    pub description: Option<String>,

    /// Caller-defined key-value pairs attached to the payment.
    pub metadata: Metadata,
}

/// Command to patch an existing payment.
///
/// All parts are optional; a patch carrying an illegal status transition is
/// rejected as a whole, including its metadata portion.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayment {
    pub status: Option<PaymentStatus>,

    /// Keys to overlay onto the payment's metadata.
    pub metadata: Option<Metadata>,

    /// Stored verbatim when the patch transitions the payment to Failed.
    pub failure_reason: Option<String>,
}
