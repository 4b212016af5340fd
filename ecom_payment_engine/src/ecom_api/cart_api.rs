use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CartItem, Sku},
    ecom_api::{
        cart_objects::{group_by_shop, CartGroup},
        query_objects::{LanguageFilter, Paginated, Pagination},
    },
    inventory::ValidationMode,
    traits::{CartError, CartManagement},
};

/// `CartApi` manages users' shopping carts. Every call is scoped to the user id it is given, which the caller is
/// expected to have authenticated.
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    /// Checks whether `quantity` of the SKU could be put in the user's cart, without changing anything.
    pub async fn validate(
        &self,
        user_id: i64,
        sku_id: i64,
        quantity: i64,
        mode: ValidationMode,
    ) -> Result<Sku, CartError> {
        self.db.validate_sku(user_id, sku_id, quantity, mode).await
    }

    pub async fn add_item(&self, user_id: i64, sku_id: i64, quantity: i64) -> Result<CartItem, CartError> {
        let item = self.db.add_cart_item(user_id, sku_id, quantity).await?;
        debug!("🛒️ User #{user_id} added {quantity} of SKU #{sku_id} to their cart");
        Ok(item)
    }

    pub async fn update_item(
        &self,
        user_id: i64,
        cart_item_id: i64,
        sku_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartError> {
        let item = self.db.update_cart_item(user_id, cart_item_id, sku_id, quantity).await?;
        debug!("🛒️ User #{user_id} changed cart item #{cart_item_id} to {quantity} of SKU #{sku_id}");
        Ok(item)
    }

    /// Deletes the user's cart items. Ids that are not in the user's cart are ignored, so a count of zero is not an
    /// error.
    pub async fn delete_items(&self, user_id: i64, cart_item_ids: &[i64]) -> Result<u64, CartError> {
        let count = self.db.delete_cart_items(user_id, cart_item_ids).await?;
        debug!("🛒️ User #{user_id} removed {count} items from their cart");
        Ok(count)
    }

    /// Lists the user's cart, grouped by shop. Pages count shops, not cart items.
    pub async fn list_grouped_by_shop(
        &self,
        user_id: i64,
        pagination: Pagination,
        language: &LanguageFilter,
    ) -> Result<Paginated<CartGroup>, CartError> {
        let items = self.db.fetch_purchasable_cart_items(user_id, language).await?;
        let groups = group_by_shop(items);
        let total = groups.len() as i64;
        trace!("🛒️ User #{user_id} has cart items from {total} shops");
        Ok(Paginated::new(pagination.slice(groups), pagination, total))
    }
}
