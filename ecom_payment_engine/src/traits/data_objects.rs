use serde::Serialize;

use crate::{
    db_types::{
        CartItem,
        Money,
        Order,
        Payment,
        Product,
        ProductSkuSnapshot,
        ProductTranslation,
        ShopSummary,
        Sku,
    },
    ecom_api::query_objects::LanguageFilter,
};

//--------------------------------------     Cart details      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub translations: Vec<ProductTranslation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuDetail {
    #[serde(flatten)]
    pub sku: Sku,
    pub product: ProductDetail,
}

/// A cart item together with the SKU, product and shop it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemDetail {
    #[serde(flatten)]
    pub item: CartItem,
    pub sku: SkuDetail,
    #[serde(skip)]
    pub shop: ShopSummary,
}

impl CartItemDetail {
    pub fn id(&self) -> i64 {
        self.item.id
    }

    pub fn quantity(&self) -> i64 {
        self.item.quantity
    }

    pub fn product(&self) -> &Product {
        &self.sku.product.product
    }
}

//--------------------------------------    Order details      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<ProductSkuSnapshot>,
}

impl OrderWithItems {
    pub fn total_price(&self) -> Money {
        self.items.iter().map(ProductSkuSnapshot::line_total).sum()
    }

    /// Drops the snapshot translations that are not in the requested language.
    pub fn retain_language(mut self, language: &LanguageFilter) -> Self {
        for item in &mut self.items {
            item.product_translations.retain(|t| language.matches(&t.language_id));
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentWithOrders {
    #[serde(flatten)]
    pub payment: Payment,
    pub orders: Vec<OrderWithItems>,
}

impl PaymentWithOrders {
    /// The amount the bank transfer must carry: the sum of every line of every order in the payment.
    pub fn total_price(&self) -> Money {
        self.orders.iter().map(OrderWithItems::total_price).sum()
    }

    /// The user that placed the orders. All the orders in a payment belong to the same user.
    pub fn user_id(&self) -> Option<i64> {
        self.orders.first().map(|o| o.order.user_id)
    }
}

//--------------------------------------  Reconciliation       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSettlement {
    pub payment_id: i64,
    pub user_id: i64,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReconcileOutcome {
    /// The transfer paid for the payment. Its orders are now waiting for pickup.
    Paid(PaymentSettlement),
    /// The payment had already been settled by an earlier transfer. Nothing was changed.
    AlreadySettled { payment_id: i64 },
}

impl ReconcileOutcome {
    pub fn payment_id(&self) -> i64 {
        match self {
            ReconcileOutcome::Paid(s) => s.payment_id,
            ReconcileOutcome::AlreadySettled { payment_id } => *payment_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryResult {
    pub expired_payments: Vec<i64>,
    pub cancelled_orders: Vec<Order>,
}

impl ExpiryResult {
    pub fn is_empty(&self) -> bool {
        self.expired_payments.is_empty() && self.cancelled_orders.is_empty()
    }
}
