use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Published after a checkout has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersCreatedEvent {
    pub user_id: i64,
    pub payment_id: i64,
    pub orders: Vec<Order>,
}

/// Published after a bank transfer has settled a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSucceededEvent {
    pub payment_id: i64,
    pub user_id: i64,
    pub order_ids: Vec<i64>,
}

impl PaymentSucceededEvent {
    pub fn new(payment_id: i64, user_id: i64, order_ids: Vec<i64>) -> Self {
        Self { payment_id, user_id, order_ids }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancellationReason {
    /// The user withdrew the order
    User,
    /// The payment window closed before the money arrived
    PaymentExpired,
}

/// Published when an order is cancelled, whether by the user or because its payment expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order: Order,
    pub reason: CancellationReason,
}

impl OrderCancelledEvent {
    pub fn new(order: Order, reason: CancellationReason) -> Self {
        Self { order, reason }
    }
}
