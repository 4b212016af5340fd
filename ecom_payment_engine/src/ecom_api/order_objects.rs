use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType, Receiver};

/// The cart items a user is checking out from one shop, and where that shop should deliver them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCheckout {
    pub shop_id: i64,
    pub receiver: Receiver,
    pub cart_item_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    /// The id the user must quote (as `DH<payment_id>`) on the bank transfer
    pub payment_id: i64,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub user_id: Option<i64>,
    pub payment_id: Option<i64>,
    pub status: Option<OrderStatusType>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl OrderQueryFilter {
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_payment_id(mut self, payment_id: i64) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.payment_id.is_none() && self.status.is_none()
    }
}

/// Query string filter for listing orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusFilter {
    pub status: Option<OrderStatusType>,
}
