use std::fmt::Display;

use ecom_payment_engine::{
    db_types::OrderStatusType,
    query_objects::{InvalidPagination, Pagination, DEFAULT_PAGE_SIZE},
    ReconcileOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// `?page=2&limit=20`. Missing values fall back to the first page and the default page size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn pagination(&self) -> Result<Pagination, InvalidPagination> {
        Pagination::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// `?page=1&limit=10&status=CANCELLED`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrderListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatusType>,
}

impl OrderListParams {
    pub fn pagination(&self) -> Result<Pagination, InvalidPagination> {
        PageParams { page: self.page, limit: self.limit }.pagination()
    }
}

/// The body returned to the bank gateway. Any 2xx response stops the gateway from retrying the delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub already_settled: bool,
}

impl WebhookAck {
    pub fn duplicate() -> Self {
        Self { success: true, payment_id: None, duplicate: true, already_settled: false }
    }
}

impl From<&ReconcileOutcome> for WebhookAck {
    fn from(outcome: &ReconcileOutcome) -> Self {
        Self {
            success: true,
            payment_id: Some(outcome.payment_id()),
            duplicate: false,
            already_settled: matches!(outcome, ReconcileOutcome::AlreadySettled { .. }),
        }
    }
}
