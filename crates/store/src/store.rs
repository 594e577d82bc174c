use async_trait::async_trait;
use common::PaymentId;
use domain::Payment;

use crate::query::PaymentQuery;

/// One page of a filtered, sorted payment set.
#[derive(Debug, Clone)]
pub struct PageSlice {
    /// The payments on the requested page, in sort order.
    pub payments: Vec<Payment>,

    /// Count of all payments matching the filter, ignoring pagination.
    pub total: usize,
}

/// Core trait for payment store implementations.
///
/// The store holds the authoritative collection and performs no validation;
/// callers supply fully mutated entities. Persistence is best-effort by
/// design: implementations log and swallow durability failures, so these
/// operations are infallible from the caller's point of view. Absence on
/// lookup is a `None`, not an error.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a payment by id and persists before returning.
    ///
    /// Ids are generated internally by the caller, so duplicate detection
    /// is not part of the contract.
    async fn create(&self, payment: Payment) -> Payment;

    /// Returns the payment with the given id, if present.
    async fn find_by_id(&self, id: PaymentId) -> Option<Payment>;

    /// Returns one page of the filtered, sorted collection.
    ///
    /// The filter applies before sorting and pagination; `total` counts the
    /// filtered set pre-slice. Out-of-range pages return an empty slice with
    /// the correct total.
    async fn find_page(&self, query: PaymentQuery) -> PageSlice;

    /// Overwrites the payment with the same id and persists.
    async fn update(&self, payment: Payment) -> Payment;
}
