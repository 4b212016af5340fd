//! E-commerce order engine
//!
//! This library contains the core logic of the shop backend: carts, checkout and bank-transfer reconciliation. It is
//! transport-agnostic; the HTTP surface lives in the `ecom_payment_server` crate.
//!
//! The library is divided into these main sections:
//! 1. Validation rules ([`mod@inventory`] and [`mod@checkout`]). These are pure functions that decide whether a cart
//!    line or a checkout request may proceed. They are re-run inside every write transaction.
//! 2. Database management ([`mod@sqlite`]). SQLite is the supported backend. You should never need to access the
//!    database directly. Instead, use the public API. The data types stored in the database are defined in
//!    [`mod@db_types`] and are public.
//! 3. The public API ([`mod@ecom_api`]). [`CartApi`], [`OrderFlowApi`] and [`PaymentApi`] are generic over the traits
//!    in [`mod@traits`], which a backend implements in order to serve the shop.
//!
//! The engine also emits events when orders are created, paid for or cancelled. Hooks can be attached to these events
//! (see [`mod@events`]) to, for example, push a notification to the buyer when their payment has been received.
pub mod checkout;
pub mod db_types;
pub mod ecom_api;
pub mod events;
pub mod helpers;
pub mod inventory;
pub mod sqlite;
pub mod traits;

#[cfg(feature = "test_utils")]
pub mod test_utils;

pub use ecom_api::{
    cart_api::CartApi,
    cart_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_api::PaymentApi,
    payment_objects,
    query_objects,
};
pub use sqlite::SqliteDatabase;
pub use traits::{
    CartError,
    CartManagement,
    OrderFlowError,
    OrderManagement,
    PaymentError,
    PaymentGatewayDatabase,
    ReconcileOutcome,
};
