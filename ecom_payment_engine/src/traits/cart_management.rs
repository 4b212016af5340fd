use thiserror::Error;

use crate::{
    db_types::{CartItem, Sku},
    ecom_api::query_objects::LanguageFilter,
    inventory::ValidationMode,
    traits::data_objects::CartItemDetail,
};

/// Backend behaviour for a user's shopping cart.
///
/// Every method is scoped to `user_id`. A user can never read or change another user's cart.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Checks whether `quantity` of the SKU may be placed in the user's cart, and returns the SKU if so. Nothing is
    /// changed.
    async fn validate_sku(
        &self,
        user_id: i64,
        sku_id: i64,
        quantity: i64,
        mode: ValidationMode,
    ) -> Result<Sku, CartError>;

    /// Adds `quantity` of the SKU to the cart. If the SKU is already in the cart, the quantities are added together.
    async fn add_cart_item(&self, user_id: i64, sku_id: i64, quantity: i64) -> Result<CartItem, CartError>;

    /// Replaces the SKU and quantity of one of the user's cart items.
    async fn update_cart_item(
        &self,
        user_id: i64,
        cart_item_id: i64,
        sku_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartError>;

    /// Deletes the given cart items, ignoring any that do not belong to the user. Returns the number removed.
    async fn delete_cart_items(&self, user_id: i64, cart_item_ids: &[i64]) -> Result<u64, CartError>;

    /// Fetches the cart items whose products can currently be bought, most recently updated first.
    async fn fetch_purchasable_cart_items(
        &self,
        user_id: i64,
        language: &LanguageFilter,
    ) -> Result<Vec<CartItemDetail>, CartError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("SKU {0} does not exist")]
    SkuNotFound(i64),
    #[error("SKU {0} does not have enough stock")]
    OutOfStock(i64),
    #[error("Invalid quantity. {0}")]
    InvalidQuantity(String),
    #[error("SKU {0} is not in the cart")]
    CartItemNotFound(i64),
    #[error("The product for SKU {0} is not available")]
    ProductNotFound(i64),
    #[error("Cart item {0} does not exist")]
    NotFound(i64),
    #[error("SKU {0} is already in the cart under a different cart item")]
    SkuAlreadyInCart(i64),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}
