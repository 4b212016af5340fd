//! # E-commerce engine public API
//!
//! The `ecom_api` module exposes the programmatic API for the engine.
//! The API is modular, so that clients of the API can pick and choose the functionality they want.
//!
//! * [`cart_api`] manages users' shopping carts.
//! * [`order_flow_api`] turns carts into orders at checkout, and gives users access to their orders.
//! * [`payment_api`] matches bank transfers with payments, and expires payments that are never paid.
//!
//! The other submodules in this module are support types for the APIs.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! ```rust,ignore
//! use ecom_payment_engine::{CartApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CartManagement
//! let api = CartApi::new(db);
//! let item = api.add_item(user_id, sku_id, 2).await?;
//! ```

pub mod cart_api;
pub mod cart_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_api;
pub mod payment_objects;
pub mod query_objects;
