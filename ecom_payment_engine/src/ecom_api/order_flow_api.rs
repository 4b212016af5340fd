use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{Order, OrderStatusType},
    ecom_api::{
        order_objects::{CheckoutResult, OrderQueryFilter, ShopCheckout},
        query_objects::{LanguageFilter, Paginated, Pagination},
    },
    events::{CancellationReason, EventProducers, OrderCancelledEvent, OrdersCreatedEvent},
    traits::{OrderFlowError, OrderManagement, OrderWithItems},
};

/// How long a checkout waits for its bank transfer before the orders are cancelled, unless configured otherwise.
pub const DEFAULT_UNPAID_ORDER_TIMEOUT_HOURS: i64 = 24;

/// `OrderFlowApi` is the primary API for turning carts into orders, and for users' access to their orders.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    unpaid_order_timeout: Duration,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, unpaid_order_timeout: Duration::hours(DEFAULT_UNPAID_ORDER_TIMEOUT_HOURS) }
    }

    pub fn with_unpaid_order_timeout(mut self, timeout: Duration) -> Self {
        self.unpaid_order_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Checks out the given cart items, creating one order per shop and a single payment covering all of them.
    ///
    /// The whole checkout succeeds or fails as one. On success, the `OrdersCreated` hook is notified.
    pub async fn create_orders(
        &self,
        user_id: i64,
        checkout: &[ShopCheckout],
    ) -> Result<CheckoutResult, OrderFlowError> {
        let result = self.db.create_orders(user_id, checkout, self.unpaid_order_timeout).await?;
        info!(
            "🔄️📦️ User #{user_id} checked out {} orders. Waiting for payment DH{}",
            result.orders.len(),
            result.payment_id
        );
        let event = OrdersCreatedEvent { user_id, payment_id: result.payment_id, orders: result.orders.clone() };
        self.producers.publish_orders_created(event).await;
        Ok(result)
    }

    /// Cancels one of the user's unpaid orders.
    pub async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Order, OrderFlowError> {
        let order = self.db.cancel_order(user_id, order_id).await?;
        info!("🔄️📦️ Order #{order_id} was cancelled by user #{user_id}");
        let event = OrderCancelledEvent::new(order.clone(), CancellationReason::User);
        self.producers.publish_order_cancelled(event).await;
        Ok(order)
    }

    /// A page of the user's orders, newest first, optionally restricted to one status.
    pub async fn list_orders(
        &self,
        user_id: i64,
        status: Option<OrderStatusType>,
        pagination: Pagination,
        language: &LanguageFilter,
    ) -> Result<Paginated<OrderWithItems>, OrderFlowError> {
        let mut filter = OrderQueryFilter::default().with_user_id(user_id);
        filter.status = status;
        let (orders, total) = self.db.search_orders(filter, pagination).await?;
        let orders = orders.into_iter().map(|o| o.retain_language(language)).collect();
        Ok(Paginated::new(orders, pagination, total))
    }

    pub async fn order_detail(
        &self,
        user_id: i64,
        order_id: i64,
        language: &LanguageFilter,
    ) -> Result<OrderWithItems, OrderFlowError> {
        let order =
            self.db.fetch_order_for_user(user_id, order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        Ok(order.retain_language(language))
    }
}
