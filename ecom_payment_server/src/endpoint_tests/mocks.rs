use chrono::{DateTime, Duration, Utc};
use ecom_payment_engine::{
    db_types::{CartItem, NewPaymentTransaction, Order, PaymentTimeoutJob, PaymentTransaction, Sku},
    inventory::ValidationMode,
    order_objects::{CheckoutResult, OrderQueryFilter, ShopCheckout},
    query_objects::{LanguageFilter, Pagination},
    traits::{
        CartError,
        CartItemDetail,
        CartManagement,
        ExpiryResult,
        OrderFlowError,
        OrderManagement,
        OrderWithItems,
        PaymentError,
        PaymentGatewayDatabase,
        PaymentWithOrders,
        ReconcileOutcome,
    },
};
use mockall::mock;

mock! {
    pub CartManager {}
    impl CartManagement for CartManager {
        async fn validate_sku(&self, user_id: i64, sku_id: i64, quantity: i64, mode: ValidationMode) -> Result<Sku, CartError>;
        async fn add_cart_item(&self, user_id: i64, sku_id: i64, quantity: i64) -> Result<CartItem, CartError>;
        async fn update_cart_item(&self, user_id: i64, cart_item_id: i64, sku_id: i64, quantity: i64) -> Result<CartItem, CartError>;
        async fn delete_cart_items(&self, user_id: i64, cart_item_ids: &[i64]) -> Result<u64, CartError>;
        async fn fetch_purchasable_cart_items(&self, user_id: i64, language: &LanguageFilter) -> Result<Vec<CartItemDetail>, CartError>;
    }
}

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn create_orders(&self, user_id: i64, checkout: &[ShopCheckout], payment_timeout: Duration) -> Result<CheckoutResult, OrderFlowError>;
        async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Order, OrderFlowError>;
        async fn search_orders(&self, filter: OrderQueryFilter, pagination: Pagination) -> Result<(Vec<OrderWithItems>, i64), OrderFlowError>;
        async fn fetch_order_for_user(&self, user_id: i64, order_id: i64) -> Result<Option<OrderWithItems>, OrderFlowError>;
    }
}

mock! {
    pub PaymentGateway {}
    impl Clone for PaymentGateway {
        fn clone(&self) -> Self;
    }
    impl PaymentGatewayDatabase for PaymentGateway {
        fn url(&self) -> &str;
        async fn reconcile_transfer(&self, transfer: NewPaymentTransaction) -> Result<ReconcileOutcome, PaymentError>;
        async fn remove_payment_timeout(&self, payment_id: i64) -> Result<bool, PaymentError>;
        async fn expire_pending_payments(&self, now: DateTime<Utc>) -> Result<ExpiryResult, PaymentError>;
        async fn fetch_payment(&self, payment_id: i64) -> Result<Option<PaymentWithOrders>, PaymentError>;
        async fn fetch_payment_transaction(&self, id: i64) -> Result<Option<PaymentTransaction>, PaymentError>;
        async fn fetch_payment_timeout(&self, payment_id: i64) -> Result<Option<PaymentTimeoutJob>, PaymentError>;
        async fn close(&mut self) -> Result<(), PaymentError>;
    }
}
