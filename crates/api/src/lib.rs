//! HTTP API server for the payment platform.
//!
//! Provides REST endpoints for payment creation, lookup, validated updates
//! and filtered pagination, with structured logging (tracing), Prometheus
//! metrics and an API-key check on the payment routes.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use service::PaymentService;
use simulator::{ProcessingSimulator, SimulatorConfig};
use store::{PaymentLocks, PaymentStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::ApiKey;
use routes::payments::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// The API-key check wraps the payment routes only; `/health` and
/// `/metrics` stay open.
pub fn create_app<S: PaymentStore + Clone + Send + Sync + 'static>(
    state: Arc<AppState<S>>,
    api_key: ApiKey,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let payment_routes = Router::new()
        .route("/payments", post(routes::payments::create::<S>))
        .route("/payments", get(routes::payments::list::<S>))
        .route("/payments/{id}", get(routes::payments::get::<S>))
        .route("/payments/{id}", patch(routes::payments::update::<S>))
        .route(
            "/payments/customer/{customer_id}",
            get(routes::payments::list_by_customer::<S>),
        )
        .route(
            "/payments/status/{status}",
            get(routes::payments::list_by_status::<S>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            api_key,
            auth::require_api_key,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(payment_routes)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state around the given store.
pub fn create_default_state<S: PaymentStore + Clone + Send + Sync + 'static>(
    store: S,
    simulator_config: SimulatorConfig,
) -> Arc<AppState<S>> {
    let locks = Arc::new(PaymentLocks::new());
    let simulator = Arc::new(ProcessingSimulator::new(
        store.clone(),
        locks.clone(),
        simulator_config,
    ));
    let payment_service = PaymentService::new(store, simulator.clone(), locks);

    Arc::new(AppState {
        payment_service,
        simulator,
    })
}
