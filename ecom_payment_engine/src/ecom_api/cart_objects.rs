use serde::{Deserialize, Serialize};

use crate::{db_types::ShopSummary, traits::CartItemDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRequest {
    pub sku_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCartItemsRequest {
    pub cart_item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCartItemsResult {
    pub deleted_count: u64,
}

/// The cart items a user holds from one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartGroup {
    pub shop: ShopSummary,
    pub cart_items: Vec<CartItemDetail>,
}

/// Groups cart items by the shop that owns their SKU. Groups are in the order their shop first appears in `items`,
/// and items keep their relative order within a group.
pub fn group_by_shop(items: Vec<CartItemDetail>) -> Vec<CartGroup> {
    let mut groups: Vec<CartGroup> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.shop.id == item.shop.id) {
            Some(group) => group.cart_items.push(item),
            None => groups.push(CartGroup { shop: item.shop.clone(), cart_items: vec![item] }),
        }
    }
    groups
}
