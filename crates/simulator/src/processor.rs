//! Fire-and-forget processing pipeline, one task per created payment.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::PaymentId;
use domain::{Metadata, Payment, PaymentError, PaymentStatus};
use rand::Rng;
use store::{PaymentLocks, PaymentStore};
use tokio::task::JoinHandle;

use crate::config::SimulatorConfig;
use crate::outcome::{APPROVAL_MESSAGE, Outcome, draw_outcome};

/// Reason recorded when the pipeline itself blows up.
const INTERNAL_ERROR_REASON: &str = "Internal processing error";

/// Drives payments from Pending to a terminal processing outcome.
///
/// Each scheduled payment gets its own spawned task; the registry keeps the
/// join handles so [`ProcessingSimulator::cancel_all`] can abort everything
/// still waiting on a timer during shutdown or test teardown. Cancelling
/// never rolls back a status change that was already persisted.
pub struct ProcessingSimulator<S> {
    store: S,
    locks: Arc<PaymentLocks>,
    config: SimulatorConfig,
    tasks: Arc<Mutex<HashMap<PaymentId, JoinHandle<()>>>>,
}

impl<S> ProcessingSimulator<S>
where
    S: PaymentStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: S, locks: Arc<PaymentLocks>, config: SimulatorConfig) -> Self {
        Self {
            store,
            locks,
            config,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedules background processing for `id` and returns immediately.
    ///
    /// Scheduled exactly once per creation; the pipeline re-reads all state
    /// from the store after each wait, so the id is the only state carried.
    pub fn schedule(&self, id: PaymentId) {
        let store = self.store.clone();
        let locks = self.locks.clone();
        let config = self.config.clone();
        let tasks = self.tasks.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = run_pipeline(&store, &locks, &config, id).await {
                tracing::error!(payment_id = %id, error = %e, "processing pipeline failed");
                force_failure(&store, &locks, id).await;
            }
            tasks.lock().unwrap().remove(&id);
        });

        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.insert(id, handle);
    }

    /// Number of scheduled pipelines that have not finished yet.
    pub fn pending_count(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.len()
    }

    /// Aborts every outstanding pipeline.
    ///
    /// Pending timers never fire; transitions already persisted stay.
    pub fn cancel_all(&self) {
        let drained: Vec<(PaymentId, JoinHandle<()>)> =
            self.tasks.lock().unwrap().drain().collect();
        let cancelled = drained.len();
        for (_, handle) in drained {
            handle.abort();
        }
        if cancelled > 0 {
            tracing::info!(cancelled, "cancelled outstanding processing tasks");
        }
    }
}

/// The two-phase pipeline: delay, advance to Processing, delay, settle.
async fn run_pipeline<S: PaymentStore>(
    store: &S,
    locks: &PaymentLocks,
    config: &SimulatorConfig,
    id: PaymentId,
) -> Result<(), PaymentError> {
    tokio::time::sleep(random_delay(config)).await;

    {
        let _guard = locks.acquire(id).await;
        let Some(mut payment) = store.find_by_id(id).await else {
            tracing::warn!(payment_id = %id, "payment disappeared before processing");
            return Ok(());
        };
        payment.transition_to(PaymentStatus::Processing, None)?;
        store.update(payment).await;
        tracing::debug!(payment_id = %id, "payment moved to processing");
    }

    tokio::time::sleep(random_delay(config)).await;

    let _guard = locks.acquire(id).await;
    let Some(mut payment) = store.find_by_id(id).await else {
        tracing::warn!(payment_id = %id, "payment disappeared mid-processing");
        return Ok(());
    };

    match draw_outcome(&payment, config) {
        Outcome::Approved { transaction_id } => {
            payment.transition_to(PaymentStatus::Completed, None)?;
            payment.merge_metadata(Metadata::from([
                (
                    "transaction_id".to_string(),
                    serde_json::Value::String(transaction_id),
                ),
                (
                    "gateway_message".to_string(),
                    serde_json::Value::String(APPROVAL_MESSAGE.to_string()),
                ),
            ]));
            let payment = store.update(payment).await;
            metrics::counter!("payments_completed_total").increment(1);
            tracing::info!(payment_id = %id, amount = payment.amount(), "payment completed");
        }
        Outcome::Declined { reason } => {
            payment.transition_to(PaymentStatus::Failed, Some(reason.to_string()))?;
            store.update(payment).await;
            metrics::counter!("payments_failed_total").increment(1);
            tracing::info!(payment_id = %id, reason, "payment failed");
        }
    }

    Ok(())
}

/// Last-resort recovery: mark the payment failed with a generic reason.
///
/// Goes through the state machine like every other mutation; if even that
/// transition is illegal (the payment was cancelled mid-flight, say), the
/// failure is logged and nothing else is retried.
async fn force_failure<S: PaymentStore>(store: &S, locks: &PaymentLocks, id: PaymentId) {
    let _guard = locks.acquire(id).await;
    let Some(mut payment) = store.find_by_id(id).await else {
        return;
    };

    match payment.transition_to(PaymentStatus::Failed, Some(INTERNAL_ERROR_REASON.to_string())) {
        Ok(()) => {
            store.update(payment).await;
            metrics::counter!("payments_failed_total").increment(1);
        }
        Err(e) => {
            tracing::error!(payment_id = %id, error = %e, "unable to force-fail payment");
        }
    }
}

fn random_delay(config: &SimulatorConfig) -> Duration {
    let min = config.min_delay.as_millis() as u64;
    let max = config.max_delay.as_millis() as u64;
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}
