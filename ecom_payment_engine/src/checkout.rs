//! Validation of a checkout request against the cart items it consumes.
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{
    ecom_api::order_objects::ShopCheckout,
    traits::{CartItemDetail, OrderFlowError},
};

/// Every cart item id in the checkout, in request order. Duplicates are kept.
pub fn requested_cart_item_ids(checkout: &[ShopCheckout]) -> Vec<i64> {
    checkout.iter().flat_map(|group| group.cart_item_ids.iter().copied()).collect()
}

pub fn check_not_empty(checkout: &[ShopCheckout]) -> Result<(), OrderFlowError> {
    if checkout.is_empty() || checkout.iter().any(|group| group.cart_item_ids.is_empty()) {
        return Err(OrderFlowError::EmptyCheckout);
    }
    Ok(())
}

/// Checks a checkout request against the user's cart items that it names. `items` must hold exactly the cart items of
/// the user whose ids appear in the request.
///
/// The checks are applied in order over all the items before moving on to the next check:
/// 1. Every requested id must be found, and no id may be requested twice (`CartItemNotFound`).
/// 2. Every SKU must exist and have at least the cart quantity in stock (`OutOfStock`).
/// 3. Every product must be purchasable (`ProductNotFound`).
/// 4. Every SKU must belong to the shop of the group it was submitted under (`SkuNotBelongToShop`).
pub fn validate_checkout(
    checkout: &[ShopCheckout],
    items: &[CartItemDetail],
    now: DateTime<Utc>,
) -> Result<(), OrderFlowError> {
    check_not_empty(checkout)?;
    let requested = requested_cart_item_ids(checkout);
    let distinct = items.iter().map(CartItemDetail::id).collect::<HashSet<_>>();
    if distinct.len() != requested.len() || requested.iter().any(|id| !distinct.contains(id)) {
        return Err(OrderFlowError::CartItemNotFound);
    }
    if let Some(item) = items.iter().find(|i| i.sku.sku.is_deleted() || i.sku.sku.stock < i.quantity()) {
        return Err(OrderFlowError::OutOfStock(item.sku.sku.id));
    }
    if let Some(item) = items.iter().find(|i| !i.product().is_purchasable(now)) {
        return Err(OrderFlowError::ProductNotFound(item.product().id));
    }
    let by_id = items.iter().map(|i| (i.id(), i)).collect::<HashMap<_, _>>();
    for group in checkout {
        for id in &group.cart_item_ids {
            let sku = by_id.get(id).map(|i| &i.sku.sku).ok_or(OrderFlowError::CartItemNotFound)?;
            if sku.created_by_id != group.shop_id {
                return Err(OrderFlowError::SkuNotBelongToShop { sku_id: sku.id, shop_id: group.shop_id });
            }
        }
    }
    Ok(())
}
