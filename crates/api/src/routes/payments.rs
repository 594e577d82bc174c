//! Payment CRUD and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::PaymentId;
use domain::{CreatePayment, Metadata, Payment, PaymentMethod, PaymentStatus, UpdatePayment};
use serde::{Deserialize, Serialize};
use service::{ListParams, Page, PaymentService};
use simulator::ProcessingSimulator;
use store::{PaymentStore, SortField, SortOrder};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S>
where
    S: PaymentStore + Clone + Send + Sync + 'static,
{
    pub payment_service: PaymentService<S>,
    pub simulator: Arc<ProcessingSimulator<S>>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub customer_id: String,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
}

impl CreatePaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.amount <= 0 {
            return Err(ApiError::BadRequest(
                "amount must be a positive integer".to_string(),
            ));
        }
        if self.currency.is_empty() || self.currency.len() > 3 {
            return Err(ApiError::BadRequest(
                "currency must be 1-3 characters".to_string(),
            ));
        }
        if self.customer_id.is_empty() {
            return Err(ApiError::BadRequest(
                "customer_id must not be empty".to_string(),
            ));
        }
        if let Some(description) = &self.description
            && description.len() > 500
        {
            return Err(ApiError::BadRequest(
                "description must be at most 500 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, Default)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,
    pub metadata: Option<Metadata>,
    pub failure_reason: Option<String>,
}

impl UpdatePaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(reason) = &self.failure_reason
            && reason.len() > 1000
        {
            return Err(ApiError::BadRequest(
                "failure_reason must be at most 1000 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query parameters shared by the list endpoints.
#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    fn params(&self) -> ListParams {
        ListParams {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(10),
            sort_field: self
                .sort_by
                .as_deref()
                .map(SortField::parse_or_default)
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse_or_default)
                .unwrap_or_default(),
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub metadata: Metadata,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id().to_string(),
            amount: payment.amount(),
            currency: payment.currency().to_string(),
            payment_method: payment.payment_method(),
            status: payment.status(),
            customer_id: payment.customer_id().to_string(),
            description: payment.description().map(String::from),
            metadata: payment.metadata().clone(),
            created_at: payment.created_at().to_rfc3339(),
            updated_at: payment.updated_at().to_rfc3339(),
            processed_at: payment.processed_at().map(|t| t.to_rfc3339()),
            failure_reason: payment.failure_reason().map(String::from),
        }
    }
}

// -- Handlers --

/// POST /payments — create a payment and schedule its processing.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: PaymentStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(axum::http::StatusCode, Json<PaymentResponse>), ApiError> {
    req.validate()?;

    let payment = state
        .payment_service
        .create_payment(CreatePayment {
            amount: req.amount,
            currency: req.currency,
            payment_method: req.payment_method,
            customer_id: req.customer_id,
            description: req.description,
            metadata: req.metadata.unwrap_or_default(),
        })
        .await;

    Ok((axum::http::StatusCode::CREATED, Json(payment.into())))
}

/// GET /payments/:id — fetch a payment by id.
#[tracing::instrument(skip(state))]
pub async fn get<S: PaymentStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let id = parse_payment_id(&id)?;
    let payment = state.payment_service.get_payment(id).await?;
    Ok(Json(payment.into()))
}

/// PATCH /payments/:id — apply a status transition and/or metadata merge.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: PaymentStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    req.validate()?;
    let id = parse_payment_id(&id)?;

    let payment = state
        .payment_service
        .update_payment(
            id,
            UpdatePayment {
                status: req.status,
                metadata: req.metadata,
                failure_reason: req.failure_reason,
            },
        )
        .await?;

    Ok(Json(payment.into()))
}

/// GET /payments — list payments, optionally filtered by exactly one of
/// `customer_id` or `status`.
#[tracing::instrument(skip(state, query))]
pub async fn list<S: PaymentStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<PaymentResponse>>, ApiError> {
    let params = query.params();

    let page = match (&query.customer_id, &query.status) {
        (Some(_), Some(_)) => {
            return Err(ApiError::BadRequest(
                "customer_id and status filters are mutually exclusive".to_string(),
            ));
        }
        (Some(customer_id), None) => {
            state
                .payment_service
                .list_by_customer(customer_id, params)
                .await
        }
        (None, Some(status)) => {
            let status = parse_status(status)?;
            state.payment_service.list_by_status(status, params).await
        }
        (None, None) => state.payment_service.list_payments(params).await,
    };

    Ok(Json(page.map(PaymentResponse::from)))
}

/// GET /payments/customer/:customer_id — list one customer's payments.
#[tracing::instrument(skip(state, query))]
pub async fn list_by_customer<S: PaymentStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(customer_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<PaymentResponse>>, ApiError> {
    let page = state
        .payment_service
        .list_by_customer(&customer_id, query.params())
        .await;
    Ok(Json(page.map(PaymentResponse::from)))
}

/// GET /payments/status/:status — list payments in one status.
#[tracing::instrument(skip(state, query))]
pub async fn list_by_status<S: PaymentStore + Clone + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(status): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<PaymentResponse>>, ApiError> {
    let status = parse_status(&status)?;
    let page = state
        .payment_service
        .list_by_status(status, query.params())
        .await;
    Ok(Json(page.map(PaymentResponse::from)))
}

fn parse_payment_id(id: &str) -> Result<PaymentId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid payment id: {e}")))?;
    Ok(PaymentId::from(uuid))
}

fn parse_status(status: &str) -> Result<PaymentStatus, ApiError> {
    PaymentStatus::parse(status).map_err(|e| ApiError::BadRequest(e.to_string()))
}
