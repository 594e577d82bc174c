//! Payment service operations.

use std::sync::Arc;

use common::PaymentId;
use domain::{CreatePayment, Payment, PaymentStatus, UpdatePayment};
use simulator::ProcessingSimulator;
use store::{PaymentFilter, PaymentLocks, PaymentQuery, PaymentStore, SortField, SortOrder};

use crate::error::{Result, ServiceError};
use crate::page::Page;

/// Pagination and sort parameters for list operations.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: usize,
    pub limit: usize,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// Orchestrates payment creation, lookup, validated updates and queries.
///
/// Mutating operations on an existing payment run under that payment's lock
/// so a manual patch and the simulator's pipeline cannot interleave their
/// read-modify-write sequences on the same id.
pub struct PaymentService<S>
where
    S: PaymentStore + Clone + Send + Sync + 'static,
{
    store: S,
    simulator: Arc<ProcessingSimulator<S>>,
    locks: Arc<PaymentLocks>,
}

impl<S> PaymentService<S>
where
    S: PaymentStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: S, simulator: Arc<ProcessingSimulator<S>>, locks: Arc<PaymentLocks>) -> Self {
        Self {
            store,
            simulator,
            locks,
        }
    }

    /// Creates a pending payment and schedules its background processing.
    ///
    /// Returns as soon as the entity is stored; the simulator settles it
    /// later.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id))]
    pub async fn create_payment(&self, cmd: CreatePayment) -> Payment {
        let payment = self.store.create(Payment::new(cmd)).await;
        self.simulator.schedule(payment.id());

        metrics::counter!("payments_created_total").increment(1);
        tracing::info!(payment_id = %payment.id(), amount = payment.amount(), "payment created");
        payment
    }

    /// Looks a payment up by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        self.store
            .find_by_id(id)
            .await
            .ok_or(ServiceError::NotFound(id))
    }

    /// Applies a validated patch to a payment.
    ///
    /// A patch whose status portion is an illegal transition is rejected as
    /// a whole — its metadata portion is not applied either.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_payment(&self, id: PaymentId, patch: UpdatePayment) -> Result<Payment> {
        let _guard = self.locks.acquire(id).await;

        let mut payment = self
            .store
            .find_by_id(id)
            .await
            .ok_or(ServiceError::NotFound(id))?;

        if let Some(next) = patch.status {
            payment.transition_to(next, patch.failure_reason)?;
            tracing::info!(payment_id = %id, status = %next, "payment status updated");
        }
        if let Some(extra) = patch.metadata {
            payment.merge_metadata(extra);
        }

        Ok(self.store.update(payment).await)
    }

    /// Lists all payments, paginated.
    #[tracing::instrument(skip(self))]
    pub async fn list_payments(&self, params: ListParams) -> Page<Payment> {
        self.list(PaymentFilter::None, params).await
    }

    /// Lists one customer's payments, paginated.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_customer(&self, customer_id: &str, params: ListParams) -> Page<Payment> {
        self.list(PaymentFilter::CustomerId(customer_id.to_string()), params)
            .await
    }

    /// Lists payments in one status, paginated.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_status(&self, status: PaymentStatus, params: ListParams) -> Page<Payment> {
        self.list(PaymentFilter::Status(status), params).await
    }

    async fn list(&self, filter: PaymentFilter, params: ListParams) -> Page<Payment> {
        let query = PaymentQuery {
            page: params.page,
            limit: params.limit,
            sort_field: params.sort_field,
            sort_order: params.sort_order,
            filter,
        };
        let slice = self.store.find_page(query).await;
        Page::new(slice.payments, params.page, params.limit, slice.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Metadata, PaymentError, PaymentMethod};
    use serde_json::json;
    use simulator::SimulatorConfig;
    use std::time::Duration;
    use store::InMemoryPaymentStore;

    /// Service whose simulator waits far longer than any test runs, so
    /// payments stay exactly where the test puts them.
    fn quiescent_service() -> PaymentService<InMemoryPaymentStore> {
        let store = InMemoryPaymentStore::new();
        let locks = Arc::new(PaymentLocks::new());
        let config = SimulatorConfig {
            min_delay: Duration::from_secs(600),
            max_delay: Duration::from_secs(600),
            ..SimulatorConfig::default()
        };
        let simulator = Arc::new(ProcessingSimulator::new(
            store.clone(),
            locks.clone(),
            config,
        ));
        PaymentService::new(store, simulator, locks)
    }

    fn create_cmd(amount: i64, customer_id: &str) -> CreatePayment {
        CreatePayment {
            amount,
            currency: "USD".to_string(),
            payment_method: PaymentMethod::CreditCard,
            customer_id: customer_id.to_string(),
            description: None,
            metadata: Metadata::new(),
        }
    }

    #[tokio::test]
    async fn test_created_payment_is_pending_and_fetchable() {
        let service = quiescent_service();
        let payment = service.create_payment(create_cmd(1000, "c1")).await;

        assert_eq!(payment.status(), PaymentStatus::Pending);
        assert_eq!(payment.created_at(), payment.updated_at());

        let fetched = service.get_payment(payment.id()).await.unwrap();
        assert_eq!(fetched, payment);
    }

    #[tokio::test]
    async fn test_get_payment_not_found() {
        let service = quiescent_service();
        let id = PaymentId::new();
        assert!(matches!(
            service.get_payment(id).await,
            Err(ServiceError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_update_applies_legal_transition() {
        let service = quiescent_service();
        let payment = service.create_payment(create_cmd(1000, "c1")).await;

        let updated = service
            .update_payment(
                payment.id(),
                UpdatePayment {
                    status: Some(PaymentStatus::Cancelled),
                    ..UpdatePayment::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), PaymentStatus::Cancelled);
        assert!(updated.updated_at() >= payment.updated_at());
    }

    #[tokio::test]
    async fn test_update_rejects_illegal_transition_entirely() {
        let service = quiescent_service();
        let payment = service.create_payment(create_cmd(1000, "c1")).await;

        let result = service
            .update_payment(
                payment.id(),
                UpdatePayment {
                    status: Some(PaymentStatus::Refunded),
                    metadata: Some(Metadata::from([("note".to_string(), json!("hi"))])),
                    failure_reason: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Payment(PaymentError::InvalidTransition { .. }))
        ));

        // The stored entity is untouched, metadata portion included.
        let stored = service.get_payment(payment.id()).await.unwrap();
        assert_eq!(stored.status(), PaymentStatus::Pending);
        assert!(stored.metadata().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_only_update_merges() {
        let service = quiescent_service();
        let payment = service.create_payment(create_cmd(1000, "c1")).await;

        service
            .update_payment(
                payment.id(),
                UpdatePayment {
                    metadata: Some(Metadata::from([("a".to_string(), json!(1))])),
                    ..UpdatePayment::default()
                },
            )
            .await
            .unwrap();
        let updated = service
            .update_payment(
                payment.id(),
                UpdatePayment {
                    metadata: Some(Metadata::from([("b".to_string(), json!(2))])),
                    ..UpdatePayment::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.metadata().get("a"), Some(&json!(1)));
        assert_eq!(updated.metadata().get("b"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_list_pagination_metadata() {
        let service = quiescent_service();
        for amount in [10, 20, 30] {
            service.create_payment(create_cmd(amount, "c1")).await;
        }

        let page = service
            .list_payments(ListParams {
                page: 2,
                limit: 1,
                sort_field: SortField::Amount,
                sort_order: SortOrder::Asc,
            })
            .await;

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].amount(), 20);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn test_list_by_customer_counts_only_that_customer() {
        let service = quiescent_service();
        service.create_payment(create_cmd(10, "c1")).await;
        service.create_payment(create_cmd(20, "c2")).await;
        service.create_payment(create_cmd(30, "c1")).await;

        let page = service.list_by_customer("c1", ListParams::default()).await;
        assert_eq!(page.total, 2);
        assert!(page.data.iter().all(|p| p.customer_id() == "c1"));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let service = quiescent_service();
        let payment = service.create_payment(create_cmd(10, "c1")).await;
        service.create_payment(create_cmd(20, "c1")).await;

        service
            .update_payment(
                payment.id(),
                UpdatePayment {
                    status: Some(PaymentStatus::Cancelled),
                    ..UpdatePayment::default()
                },
            )
            .await
            .unwrap();

        let cancelled = service
            .list_by_status(PaymentStatus::Cancelled, ListParams::default())
            .await;
        assert_eq!(cancelled.total, 1);
        assert_eq!(cancelled.data[0].id(), payment.id());

        let pending = service
            .list_by_status(PaymentStatus::Pending, ListParams::default())
            .await;
        assert_eq!(pending.total, 1);
    }
}
