use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use common::PaymentId;
use domain::Payment;
use tokio::sync::RwLock;

use crate::mirror::FileMirror;
use crate::query::{PaymentQuery, SortOrder};
use crate::store::{PageSlice, PaymentStore};

/// In-memory payment store with an optional file-backed mirror.
///
/// The map is the authoritative copy. When a mirror is configured, every
/// mutation rewrites the mirror file before returning; mirror failures are
/// logged and swallowed, leaving the in-memory state as the source of truth
/// for the rest of the process lifetime.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
    mirror: Option<Arc<FileMirror>>,
}

impl InMemoryPaymentStore {
    /// Creates a new empty store without durability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store mirrored to the file at `path`, rehydrating from it.
    ///
    /// A missing file starts an empty store. A malformed file is logged and
    /// also starts an empty store; it is overwritten on the next mutation.
    pub async fn with_mirror(path: impl Into<PathBuf>) -> Self {
        let mirror = FileMirror::new(path);
        let payments = match mirror.load().await {
            Ok(payments) => {
                tracing::info!(
                    path = %mirror.path().display(),
                    count = payments.len(),
                    "rehydrated payments from mirror"
                );
                payments
            }
            Err(e) => {
                tracing::error!(
                    path = %mirror.path().display(),
                    error = %e,
                    "failed to read payment mirror, starting empty"
                );
                Vec::new()
            }
        };

        let map: HashMap<PaymentId, Payment> =
            payments.into_iter().map(|p| (p.id(), p)).collect();

        Self {
            payments: Arc::new(RwLock::new(map)),
            mirror: Some(Arc::new(mirror)),
        }
    }

    /// Returns the total number of payments stored.
    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }

    /// Clears the in-memory collection. The mirror file is left untouched.
    pub async fn clear(&self) {
        self.payments.write().await.clear();
    }

    /// Rewrites the mirror from the given map, logging failures.
    ///
    /// Called while holding the write lock so the file always reflects a
    /// consistent snapshot in mutation order.
    async fn sync_mirror(&self, map: &HashMap<PaymentId, Payment>) {
        let Some(mirror) = &self.mirror else {
            return;
        };

        let mut snapshot: Vec<Payment> = map.values().cloned().collect();
        snapshot.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then(a.id().cmp(&b.id())));

        if let Err(e) = mirror.save(&snapshot).await {
            tracing::error!(
                path = %mirror.path().display(),
                error = %e,
                "failed to persist payment mirror"
            );
        }
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, payment: Payment) -> Payment {
        let mut map = self.payments.write().await;
        map.insert(payment.id(), payment.clone());
        self.sync_mirror(&map).await;
        payment
    }

    async fn find_by_id(&self, id: PaymentId) -> Option<Payment> {
        self.payments.read().await.get(&id).cloned()
    }

    async fn find_page(&self, query: PaymentQuery) -> PageSlice {
        let map = self.payments.read().await;

        let mut matching: Vec<Payment> = map
            .values()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .collect();
        drop(map);

        // Ties break by id so pagination is stable across equal sort keys.
        matching.sort_by(|a, b| {
            let ordering = query.sort_field.compare(a, b).then(a.id().cmp(&b.id()));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len();
        let start = query.page.saturating_sub(1).saturating_mul(query.limit);
        let payments: Vec<Payment> = matching.into_iter().skip(start).take(query.limit).collect();

        PageSlice { payments, total }
    }

    async fn update(&self, payment: Payment) -> Payment {
        let mut map = self.payments.write().await;
        map.insert(payment.id(), payment.clone());
        self.sync_mirror(&map).await;
        payment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortField;
    use domain::{CreatePayment, Metadata, PaymentMethod, PaymentStatus};

    fn make_payment(amount: i64, customer_id: &str) -> Payment {
        Payment::new(CreatePayment {
            amount,
            currency: "USD".to_string(),
            payment_method: PaymentMethod::CreditCard,
            customer_id: customer_id.to_string(),
            description: None,
            metadata: Metadata::new(),
        })
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let store = InMemoryPaymentStore::new();
        let payment = store.create(make_payment(1000, "c1")).await;

        let found = store.find_by_id(payment.id()).await;
        assert_eq!(found, Some(payment));
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_id_absent_returns_none() {
        let store = InMemoryPaymentStore::new();
        assert!(store.find_by_id(PaymentId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_overwrites_by_id() {
        let store = InMemoryPaymentStore::new();
        let mut payment = store.create(make_payment(1000, "c1")).await;

        payment
            .transition_to(PaymentStatus::Processing, None)
            .unwrap();
        store.update(payment.clone()).await;

        let found = store.find_by_id(payment.id()).await.unwrap();
        assert_eq!(found.status(), PaymentStatus::Processing);
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn test_sort_by_amount_ascending() {
        let store = InMemoryPaymentStore::new();
        for amount in [300, 100, 200] {
            store.create(make_payment(amount, "c1")).await;
        }

        let slice = store
            .find_page(PaymentQuery::new().sort(SortField::Amount, SortOrder::Asc))
            .await;

        let amounts: Vec<i64> = slice.payments.iter().map(|p| p.amount()).collect();
        assert_eq!(amounts, vec![100, 200, 300]);
        assert_eq!(slice.total, 3);
    }

    #[tokio::test]
    async fn test_default_sort_is_created_at_descending() {
        let store = InMemoryPaymentStore::new();
        let first = store.create(make_payment(1, "c1")).await;
        let second = store.create(make_payment(2, "c1")).await;

        let slice = store.find_page(PaymentQuery::new()).await;
        assert_eq!(slice.payments[0].id(), second.id());
        assert_eq!(slice.payments[1].id(), first.id());
    }

    #[tokio::test]
    async fn test_pagination_slices_after_filter_and_sort() {
        let store = InMemoryPaymentStore::new();
        for amount in [10, 20, 30] {
            store.create(make_payment(amount, "c1")).await;
        }

        let slice = store
            .find_page(
                PaymentQuery::new()
                    .page(2)
                    .limit(1)
                    .sort(SortField::Amount, SortOrder::Asc),
            )
            .await;

        assert_eq!(slice.total, 3);
        assert_eq!(slice.payments.len(), 1);
        assert_eq!(slice.payments[0].amount(), 20);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_empty_with_correct_total() {
        let store = InMemoryPaymentStore::new();
        for amount in [10, 20, 30] {
            store.create(make_payment(amount, "c1")).await;
        }

        let slice = store.find_page(PaymentQuery::new().page(5).limit(10)).await;
        assert!(slice.payments.is_empty());
        assert_eq!(slice.total, 3);
    }

    #[tokio::test]
    async fn test_filter_by_customer() {
        let store = InMemoryPaymentStore::new();
        store.create(make_payment(10, "c1")).await;
        store.create(make_payment(20, "c2")).await;
        store.create(make_payment(30, "c1")).await;

        let slice = store.find_page(PaymentQuery::new().customer("c1")).await;
        assert_eq!(slice.total, 2);
        assert!(slice.payments.iter().all(|p| p.customer_id() == "c1"));
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let store = InMemoryPaymentStore::new();
        let mut cancelled = store.create(make_payment(10, "c1")).await;
        store.create(make_payment(20, "c1")).await;

        cancelled
            .transition_to(PaymentStatus::Cancelled, None)
            .unwrap();
        store.update(cancelled.clone()).await;

        let slice = store
            .find_page(PaymentQuery::new().status(PaymentStatus::Cancelled))
            .await;
        assert_eq!(slice.total, 1);
        assert_eq!(slice.payments[0].id(), cancelled.id());
    }

    #[tokio::test]
    async fn test_equal_sort_keys_break_ties_by_id() {
        let store = InMemoryPaymentStore::new();
        for _ in 0..5 {
            store.create(make_payment(100, "c1")).await;
        }

        let query = PaymentQuery::new().sort(SortField::Amount, SortOrder::Asc);
        let first = store.find_page(query.clone()).await;
        let second = store.find_page(query).await;

        let ids = |slice: &PageSlice| slice.payments.iter().map(|p| p.id()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_mirror_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.json");

        let store = InMemoryPaymentStore::with_mirror(&path).await;
        let payment = store.create(make_payment(1000, "c1")).await;
        drop(store);

        let reopened = InMemoryPaymentStore::with_mirror(&path).await;
        let found = reopened.find_by_id(payment.id()).await;
        assert_eq!(found, Some(payment));
    }

    #[tokio::test]
    async fn test_malformed_mirror_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.json");
        tokio::fs::write(&path, b"not an array").await.unwrap();

        let store = InMemoryPaymentStore::with_mirror(&path).await;
        assert_eq!(store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_unwritable_mirror_does_not_fail_the_operation() {
        let store = InMemoryPaymentStore::with_mirror("/nonexistent/dir/payments.json").await;
        let payment = store.create(make_payment(1000, "c1")).await;

        // The write failed, but the in-memory copy stays authoritative.
        assert!(store.find_by_id(payment.id()).await.is_some());
    }
}
