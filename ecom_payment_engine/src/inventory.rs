//! Stock and availability rules for putting SKUs in a cart.
//!
//! The rules are pure functions over a snapshot of the SKU, its product and the user's existing cart item. Backends
//! read that snapshot inside the same transaction as the write that depends on it.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{CartItem, Product, Sku},
    traits::CartError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// The quantity will be added to whatever is already in the cart
    Create,
    /// The quantity will replace the existing cart item's quantity
    Update,
}

/// Checks that `quantity` of SKU `sku_id` may be placed in the cart.
///
/// The checks run in a fixed order, and the first failure is returned:
/// 1. `SkuNotFound` if the SKU does not exist or has been deleted.
/// 2. `OutOfStock` if the SKU has no stock, or less than `quantity`.
/// 3. `InvalidQuantity` if adding to the cart would leave it holding more than the stock. An update replaces the
///    quantity, so rule 2 already covers it.
/// 4. `CartItemNotFound` when updating a SKU that is not in the cart.
/// 5. `ProductNotFound` if the product is deleted, unpublished or scheduled for later.
pub fn validate_sku(
    sku_id: i64,
    sku: Option<&Sku>,
    product: Option<&Product>,
    existing: Option<&CartItem>,
    quantity: i64,
    mode: ValidationMode,
    now: DateTime<Utc>,
) -> Result<(), CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity(format!("Quantity must be at least 1, but was {quantity}")));
    }
    let sku = sku.filter(|s| !s.is_deleted()).ok_or(CartError::SkuNotFound(sku_id))?;
    if sku.stock < 1 || sku.stock < quantity {
        return Err(CartError::OutOfStock(sku_id));
    }
    match (mode, existing) {
        (ValidationMode::Create, Some(item)) if item.quantity + quantity > sku.stock => {
            return Err(CartError::InvalidQuantity(format!(
                "The cart already holds {} of SKU {sku_id}. Adding {quantity} would exceed the stock of {}",
                item.quantity, sku.stock
            )));
        },
        (ValidationMode::Update, None) => return Err(CartError::CartItemNotFound(sku_id)),
        _ => {},
    }
    match product {
        Some(p) if p.is_purchasable(now) => Ok(()),
        _ => Err(CartError::ProductNotFound(sku_id)),
    }
}
