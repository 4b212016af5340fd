//! # E-commerce payment server
//! This crate hosts the HTTP server for the cart, checkout and bank-transfer engine. It is responsible for:
//! * Serving users' carts and orders, on behalf of the user id forwarded by the upstream authentication layer.
//! * Receiving bank transfer notifications from the payment gateway and settling the matching payments.
//! * Cancelling unpaid orders once their payment window closes, via the expiry worker.
//! * Telling buyers that their payment arrived, through the notification gateway.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/cart`, `/api/cart/validate`, `/api/cart/{cart_item_id}`, `/api/cart/delete`: the user's cart.
//! * `/api/orders`, `/api/orders/{order_id}`, `/api/orders/{order_id}/cancel`: checkout and order history.
//! * `/webhooks/payment`: bank transfer notifications. Requires `Authorization: Apikey <key>`.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod identity;
pub mod middleware;
pub mod notifications;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
