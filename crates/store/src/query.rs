//! Query parameters for paginated payment reads.

use std::cmp::Ordering;

use domain::{Payment, PaymentStatus};

/// Field to order results by.
///
/// Comparison uses the field's natural type: numeric for amounts and
/// timestamps, lexicographic for the string-valued fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Amount,
    Status,
    CustomerId,
    PaymentMethod,
    Currency,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parses a field name, falling back to `CreatedAt` for unknown keys.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "amount" => SortField::Amount,
            "status" => SortField::Status,
            "customer_id" => SortField::CustomerId,
            "payment_method" => SortField::PaymentMethod,
            "currency" => SortField::Currency,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            _ => SortField::CreatedAt,
        }
    }

    /// Compares two payments on this field, ascending.
    pub fn compare(&self, a: &Payment, b: &Payment) -> Ordering {
        match self {
            SortField::Amount => a.amount().cmp(&b.amount()),
            SortField::Status => a.status().as_str().cmp(b.status().as_str()),
            SortField::CustomerId => a.customer_id().cmp(b.customer_id()),
            SortField::PaymentMethod => {
                a.payment_method().as_str().cmp(b.payment_method().as_str())
            }
            SortField::Currency => a.currency().cmp(b.currency()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        }
    }
}

/// Direction of the sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses a direction, falling back to `Desc` for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Filter narrowing the collection before sorting and pagination.
///
/// Filters are mutually exclusive; at most one applies per query.
#[derive(Debug, Clone, Default)]
pub enum PaymentFilter {
    #[default]
    None,
    CustomerId(String),
    Status(PaymentStatus),
}

impl PaymentFilter {
    /// Returns true if `payment` passes the filter.
    pub fn matches(&self, payment: &Payment) -> bool {
        match self {
            PaymentFilter::None => true,
            PaymentFilter::CustomerId(id) => payment.customer_id() == id,
            PaymentFilter::Status(status) => payment.status() == *status,
        }
    }
}

/// A paginated query over the payment collection.
#[derive(Debug, Clone)]
pub struct PaymentQuery {
    /// 1-based page number.
    pub page: usize,

    /// Maximum number of payments per page.
    pub limit: usize,

    pub sort_field: SortField,

    pub sort_order: SortOrder,

    pub filter: PaymentFilter,
}

impl PaymentQuery {
    /// Creates a query for the first page of 10, newest first, unfiltered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    /// Restricts the query to one customer's payments.
    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.filter = PaymentFilter::CustomerId(customer_id.into());
        self
    }

    /// Restricts the query to payments in one status.
    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.filter = PaymentFilter::Status(status);
        self
    }
}

impl Default for PaymentQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            filter: PaymentFilter::default(),
        }
    }
}
