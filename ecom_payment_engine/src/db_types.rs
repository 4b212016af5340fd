//! Data types that are stored in, and read from, the engine's backing store.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use ecom_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------     ShopSummary       ---------------------------------------------------------
/// The public face of a shop. Shops are the users that create products and SKUs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ShopSummary {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
}

//--------------------------------------       Product         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// `None` means the product has not been published. A future date means publication is scheduled.
    pub published_at: Option<DateTime<Utc>>,
    pub created_by_id: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product can be bought when it has not been deleted and it was published at or before `now`.
    pub fn is_purchasable(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none() && matches!(self.published_at, Some(published) if published <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProductTranslation {
    pub id: i64,
    pub product_id: i64,
    pub language_id: String,
    pub name: String,
    pub description: String,
}

//--------------------------------------         Sku           ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Sku {
    pub id: i64,
    pub product_id: i64,
    /// The shop that owns this SKU
    pub created_by_id: i64,
    pub value: String,
    pub price: Money,
    pub stock: i64,
    pub image: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sku {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

//--------------------------------------       CartItem        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub sku_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been placed and is waiting for the bank transfer that pays for it.
    PendingPayment,
    /// Payment has been received. The shop is preparing the goods for pickup.
    PendingPickup,
    /// The goods have been picked up and are on their way to the receiver.
    PendingDelivery,
    /// The receiver has the goods.
    Delivered,
    /// The order was cancelled by the user, or because payment never arrived.
    Cancelled,
    /// The goods were sent back.
    Returned,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::PendingPayment => write!(f, "PENDING_PAYMENT"),
            OrderStatusType::PendingPickup => write!(f, "PENDING_PICKUP"),
            OrderStatusType::PendingDelivery => write!(f, "PENDING_DELIVERY"),
            OrderStatusType::Delivered => write!(f, "DELIVERED"),
            OrderStatusType::Cancelled => write!(f, "CANCELLED"),
            OrderStatusType::Returned => write!(f, "RETURNED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(Self::PendingPayment),
            "PENDING_PICKUP" => Ok(Self::PendingPickup),
            "PENDING_DELIVERY" => Ok(Self::PendingDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            "RETURNED" => Ok(Self::Returned),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------       Receiver        ---------------------------------------------------------
/// Delivery details captured at checkout. Stored as JSON on the order and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub name: String,
    pub phone: String,
    pub address: String,
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatusType,
    #[sqlx(json)]
    pub receiver: Receiver,
    pub shop_id: i64,
    pub payment_id: i64,
    pub created_by_id: i64,
    pub updated_by_id: Option<i64>,
    pub deleted_by_id: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   ProductSkuSnapshot  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTranslation {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub language_id: String,
}

impl From<ProductTranslation> for SnapshotTranslation {
    fn from(t: ProductTranslation) -> Self {
        Self { id: t.id, name: t.name, description: t.description, language_id: t.language_id }
    }
}

/// An order line. The product and SKU details are copied at checkout so that later catalog edits do not change what
/// was bought, or what it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProductSkuSnapshot {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    #[sqlx(json)]
    pub product_translations: Vec<SnapshotTranslation>,
    pub sku_id: Option<i64>,
    pub sku_value: String,
    pub sku_price: Money,
    pub image: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl ProductSkuSnapshot {
    pub fn line_total(&self) -> Money {
        self.sku_price * self.quantity
    }
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Waiting for the bank transfer
    Pending,
    /// A bank transfer for the exact amount has been matched
    Success,
    /// The payment window closed before any money arrived
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Success => write!(f, "SUCCESS"),
            PaymentStatus::Failed => write!(f, "FAILED"),
        }
    }
}

//--------------------------------------        Payment        ---------------------------------------------------------
/// A payment is the root of a checkout. All the orders created in one checkout share one payment, and are paid by
/// one bank transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     TransferType      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    /// Money received into the shop's account
    In,
    /// Money leaving the shop's account
    Out,
}

//--------------------------------------  PaymentTransaction   ---------------------------------------------------------
/// The audit record of a bank transfer notification. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentTransaction {
    /// The id assigned by the bank gateway
    pub id: i64,
    pub gateway: String,
    pub transaction_date: DateTime<Utc>,
    pub account_number: Option<String>,
    pub sub_account: Option<String>,
    pub amount_in: Money,
    pub amount_out: Money,
    pub accumulated: Money,
    pub code: Option<String>,
    pub transaction_content: Option<String>,
    pub reference_number: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

//-------------------------------------- NewPaymentTransaction --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentTransaction {
    pub id: i64,
    pub gateway: String,
    pub transaction_date: DateTime<Utc>,
    pub account_number: Option<String>,
    pub sub_account: Option<String>,
    pub transfer_type: TransferType,
    pub transfer_amount: Money,
    pub accumulated: Money,
    pub code: Option<String>,
    pub content: Option<String>,
    pub reference_number: Option<String>,
    pub description: Option<String>,
}

impl NewPaymentTransaction {
    pub fn new(id: i64, transfer_amount: Money) -> Self {
        Self {
            id,
            gateway: String::default(),
            transaction_date: Utc::now(),
            account_number: None,
            sub_account: None,
            transfer_type: TransferType::In,
            transfer_amount,
            accumulated: Money::default(),
            code: None,
            content: None,
            reference_number: None,
            description: None,
        }
    }

    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn amount_in(&self) -> Money {
        match self.transfer_type {
            TransferType::In => self.transfer_amount,
            TransferType::Out => Money::default(),
        }
    }

    pub fn amount_out(&self) -> Money {
        match self.transfer_type {
            TransferType::In => Money::default(),
            TransferType::Out => self.transfer_amount,
        }
    }
}

//--------------------------------------   PaymentTimeoutJob   ---------------------------------------------------------
/// A scheduled cancellation for a payment that has not been paid yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentTimeoutJob {
    pub payment_id: i64,
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn product(published_at: Option<DateTime<Utc>>, deleted_at: Option<DateTime<Utc>>) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "p".into(),
            published_at,
            created_by_id: Some(7),
            deleted_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn purchasable_products() {
        let now = Utc::now();
        assert!(product(Some(now - Duration::days(1)), None).is_purchasable(now));
        assert!(product(Some(now), None).is_purchasable(now));
        assert!(!product(None, None).is_purchasable(now));
        assert!(!product(Some(now + Duration::minutes(5)), None).is_purchasable(now));
        assert!(!product(Some(now - Duration::days(1)), Some(now)).is_purchasable(now));
    }

    #[test]
    fn order_status_strings() {
        for status in [
            OrderStatusType::PendingPayment,
            OrderStatusType::PendingPickup,
            OrderStatusType::PendingDelivery,
            OrderStatusType::Delivered,
            OrderStatusType::Cancelled,
            OrderStatusType::Returned,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        assert!("Paid".parse::<OrderStatusType>().is_err());
        assert_eq!(serde_json::to_string(&OrderStatusType::PendingPickup).unwrap(), "\"PENDING_PICKUP\"");
    }

    #[test]
    fn transfer_direction_splits_amounts() {
        let mut tx = NewPaymentTransaction::new(1, Money::from(250));
        assert_eq!(tx.amount_in(), Money::from(250));
        assert_eq!(tx.amount_out(), Money::default());
        tx.transfer_type = TransferType::Out;
        assert_eq!(tx.amount_in(), Money::default());
        assert_eq!(tx.amount_out(), Money::from(250));
    }
}
