//! Payment entity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::PaymentId;
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

use super::{CreatePayment, PaymentMethod, PaymentStatus};

/// Caller-defined key-value pairs attached to a payment.
///
/// Content is schema-free; updates overlay keys without replacing the map.
pub type Metadata = HashMap<String, serde_json::Value>;

/// A payment record with identity and lifecycle.
///
/// All fields except `status`, `metadata`, `updated_at`, `processed_at` and
/// `failure_reason` are immutable after construction. Status changes go
/// through [`Payment::transition_to`], which enforces the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,

    /// Amount in the smallest currency unit.
    amount: i64,

    currency: String,

    payment_method: PaymentMethod,

    status: PaymentStatus,

    customer_id: String,

    description: Option<String>,

    #[serde(default)]
    metadata: Metadata,

    created_at: DateTime<Utc>,

    updated_at: DateTime<Utc>,

    /// Set exactly once, the first time status becomes Completed or Failed.
    processed_at: Option<DateTime<Utc>>,

    failure_reason: Option<String>,
}

// Query methods
impl Payment {
    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns true if the payment is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods
impl Payment {
    /// Creates a new pending payment with a fresh id.
    ///
    /// `created_at` and `updated_at` start at the same instant.
    pub fn new(cmd: CreatePayment) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            amount: cmd.amount,
            currency: cmd.currency,
            payment_method: cmd.payment_method,
            status: PaymentStatus::Pending,
            customer_id: cmd.customer_id,
            description: cmd.description,
            metadata: cmd.metadata,
            created_at: now,
            updated_at: now,
            processed_at: None,
            failure_reason: None,
        }
    }

    /// Moves the payment to `next`, enforcing the state machine.
    ///
    /// On an illegal edge the payment is left untouched and
    /// [`PaymentError::InvalidTransition`] is returned. The first transition
    /// to Completed or Failed stamps `processed_at`; a transition to Failed
    /// stores `failure_reason` verbatim when one is given.
    pub fn transition_to(
        &mut self,
        next: PaymentStatus,
        failure_reason: Option<String>,
    ) -> Result<(), PaymentError> {
        if !self.status.can_transition_to(next) {
            return Err(PaymentError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = Utc::now();

        if next.is_processing_outcome() && self.processed_at.is_none() {
            self.processed_at = Some(self.updated_at);
        }
        if next == PaymentStatus::Failed
            && let Some(reason) = failure_reason
        {
            self.failure_reason = Some(reason);
        }

        Ok(())
    }

    /// Overlays `extra` onto the payment's metadata.
    ///
    /// Keys absent from `extra` keep their prior values.
    pub fn merge_metadata(&mut self, extra: Metadata) {
        self.metadata.extend(extra);
        self.updated_at = Utc::now();
    }
}
