use chrono::Duration;
use thiserror::Error;

use crate::{
    db_types::{Order, OrderStatusType},
    ecom_api::{
        order_objects::{CheckoutResult, OrderQueryFilter, ShopCheckout},
        query_objects::Pagination,
    },
    traits::data_objects::OrderWithItems,
};

/// Backend behaviour for turning carts into orders, and for managing those orders afterwards.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Checks out the given cart items, one order per shop, in a single atomic transaction.
    ///
    /// * The cart items must all belong to `user_id`, have stock, be purchasable and belong to their group's shop.
    /// * A single `PENDING` payment is created for all the orders.
    /// * The cart items are consumed, and the stock of every SKU is decremented.
    /// * A timeout job is scheduled to cancel the orders if the payment has not arrived after `payment_timeout`.
    ///
    /// If any step fails, nothing is changed.
    async fn create_orders(
        &self,
        user_id: i64,
        checkout: &[ShopCheckout],
        payment_timeout: Duration,
    ) -> Result<CheckoutResult, OrderFlowError>;

    /// Cancels one of the user's orders. Only orders that are still waiting for payment can be cancelled. The stock
    /// held by the order is returned to the SKUs.
    async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Order, OrderFlowError>;

    /// Fetches a page of orders matching the filter, newest first, along with the total number of matching orders.
    async fn search_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<(Vec<OrderWithItems>, i64), OrderFlowError>;

    /// Fetches one of the user's orders with its line items.
    async fn fetch_order_for_user(&self, user_id: i64, order_id: i64)
        -> Result<Option<OrderWithItems>, OrderFlowError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("A checkout needs at least one shop, and every shop needs at least one cart item")]
    EmptyCheckout,
    #[error("One or more cart items do not exist")]
    CartItemNotFound,
    #[error("SKU {0} does not have enough stock")]
    OutOfStock(i64),
    #[error("Product {0} is not available")]
    ProductNotFound(i64),
    #[error("SKU {sku_id} does not belong to shop {shop_id}")]
    SkuNotBelongToShop { sku_id: i64, shop_id: i64 },
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {order_id} cannot be cancelled because it is {status}")]
    CannotCancelOrder { order_id: i64, status: OrderStatusType },
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
