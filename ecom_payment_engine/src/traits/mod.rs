//! #  Database management and control.
//!
//! This module provides the interfaces that define the interface contracts of the engine's database *backends*.
//!
//! * [`CartManagement`] covers the shopping cart: adding, changing, removing and listing a user's cart items.
//! * [`OrderManagement`] turns carts into orders in one atomic checkout, and manages those orders afterwards.
//! * [`PaymentGatewayDatabase`] reconciles bank transfers with payments, and expires payments that never arrive.
//!
//! Backends enforce the stock, cart consumption and payment settlement rules inside the store, using conditional
//! writes, so that concurrent requests cannot break them.
mod cart_management;
mod data_objects;
mod order_management;
mod payment_gateway_database;

pub use cart_management::{CartError, CartManagement};
pub use data_objects::{
    CartItemDetail,
    ExpiryResult,
    OrderWithItems,
    PaymentSettlement,
    PaymentWithOrders,
    ProductDetail,
    ReconcileOutcome,
    SkuDetail,
};
pub use order_management::{OrderFlowError, OrderManagement};
pub use payment_gateway_database::{PaymentError, PaymentGatewayDatabase};
