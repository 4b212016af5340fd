//! `SqliteDatabase` is a concrete implementation of an e-commerce engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! SQLite allows one writer at a time. Every multi-step write below starts with a write statement, so that the
//! transaction holds the write lock (waiting for it if necessary) before it reads anything it later depends on. The
//! stock, cart and payment writes are conditional as well, so a stale read can never break those rules.
//!
//! [`traits`]: crate::traits
use std::{collections::HashMap, fmt::Debug};

use chrono::{DateTime, Duration, Utc};
use log::*;
use sqlx::{migrate, SqliteConnection, SqlitePool};

use super::db::{cart, catalog, db_url, jobs, new_pool, orders, payments, transfers};
use crate::{
    checkout,
    db_types::{
        CartItem,
        NewPaymentTransaction,
        Order,
        OrderStatusType,
        PaymentStatus,
        PaymentTimeoutJob,
        PaymentTransaction,
        ProductSkuSnapshot,
        Sku,
        SnapshotTranslation,
    },
    ecom_api::{
        order_objects::{CheckoutResult, OrderQueryFilter, ShopCheckout},
        query_objects::{LanguageFilter, Pagination},
    },
    helpers::extract_payment_id,
    inventory::{validate_sku, ValidationMode},
    traits::{
        CartError,
        CartItemDetail,
        CartManagement,
        ExpiryResult,
        OrderFlowError,
        OrderManagement,
        OrderWithItems,
        PaymentError,
        PaymentGatewayDatabase,
        PaymentSettlement,
        PaymentWithOrders,
        ReconcileOutcome,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `ECOM_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Reads the SKU, its product and the user's cart item for that SKU, and checks them against the cart rules.
    async fn validate_sku_on(
        user_id: i64,
        sku_id: i64,
        quantity: i64,
        mode: ValidationMode,
        conn: &mut SqliteConnection,
    ) -> Result<Sku, CartError> {
        let sku = catalog::fetch_sku(sku_id, &mut *conn).await?;
        let product = match &sku {
            Some(s) => catalog::fetch_product(s.product_id, &mut *conn).await?,
            None => None,
        };
        let existing = cart::fetch_cart_item_for_sku(user_id, sku_id, &mut *conn).await?;
        validate_sku(sku_id, sku.as_ref(), product.as_ref(), existing.as_ref(), quantity, mode, Utc::now())?;
        sku.ok_or(CartError::SkuNotFound(sku_id))
    }

    async fn attach_translations(
        items: &mut [CartItemDetail],
        language: &LanguageFilter,
        conn: &mut SqliteConnection,
    ) -> Result<(), sqlx::Error> {
        let mut product_ids = items.iter().map(|i| i.product().id).collect::<Vec<_>>();
        product_ids.sort_unstable();
        product_ids.dedup();
        let mut by_product = HashMap::<i64, Vec<_>>::new();
        for t in catalog::fetch_translations(&product_ids, language, conn).await? {
            by_product.entry(t.product_id).or_default().push(t);
        }
        for item in items.iter_mut() {
            item.sku.product.translations = by_product.get(&item.product().id).cloned().unwrap_or_default();
        }
        Ok(())
    }

    async fn attach_snapshots(
        found: Vec<Order>,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<OrderWithItems>, sqlx::Error> {
        let ids = found.iter().map(|o| o.id).collect::<Vec<_>>();
        let mut by_order = HashMap::<i64, Vec<ProductSkuSnapshot>>::new();
        for snapshot in orders::fetch_snapshots(&ids, conn).await? {
            by_order.entry(snapshot.order_id).or_default().push(snapshot);
        }
        let result = found
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect();
        Ok(result)
    }

    async fn fetch_payment_with_orders(
        payment_id: i64,
        conn: &mut SqliteConnection,
    ) -> Result<Option<PaymentWithOrders>, sqlx::Error> {
        let Some(payment) = payments::fetch_payment(payment_id, &mut *conn).await? else {
            return Ok(None);
        };
        let found = orders::fetch_orders_for_payment(payment_id, &mut *conn).await?;
        let orders = Self::attach_snapshots(found, conn).await?;
        Ok(Some(PaymentWithOrders { payment, orders }))
    }

    /// Steps 3 onwards of reconciliation: find the payment the transfer is for, check the amount, and settle it.
    async fn settle_payment(
        transfer: &NewPaymentTransaction,
        conn: &mut SqliteConnection,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let txid = transfer.id;
        let payment_id = extract_payment_id(transfer.code.as_deref(), transfer.content.as_deref())
            .map_err(|e| PaymentError::MalformedReference(e.to_string()))?;
        trace!("🗃️ Transfer {txid} refers to payment #{payment_id}");
        let payment = Self::fetch_payment_with_orders(payment_id, &mut *conn)
            .await?
            .filter(|p| !p.orders.is_empty())
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;
        let expected = payment.total_price();
        if expected != transfer.transfer_amount {
            return Err(PaymentError::AmountMismatch { payment_id, expected, received: transfer.transfer_amount });
        }
        let user_id = payment.user_id().ok_or(PaymentError::PaymentNotFound(payment_id))?;
        let settled =
            payments::transition_payment(payment_id, PaymentStatus::Pending, PaymentStatus::Success, &mut *conn)
                .await?;
        if settled.is_none() {
            return match payment.payment.status {
                PaymentStatus::Failed => Err(PaymentError::PaymentClosed(payment_id)),
                _ => {
                    info!("🗃️ Payment #{payment_id} was already settled. Transfer {txid} changes nothing.");
                    Ok(ReconcileOutcome::AlreadySettled { payment_id })
                },
            };
        }
        let paid = orders::transition_orders_for_payment(
            payment_id,
            OrderStatusType::PendingPayment,
            OrderStatusType::PendingPickup,
            conn,
        )
        .await?;
        debug!("🗃️ Payment #{payment_id} settled by transfer {txid}. {} orders are ready for pickup", paid.len());
        Ok(ReconcileOutcome::Paid(PaymentSettlement { payment_id, user_id, orders: paid }))
    }

    /// Returns the stock held by the order's lines to their SKUs.
    async fn restore_order_stock(order_ids: &[i64], conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        for line in orders::fetch_snapshots(order_ids, &mut *conn).await? {
            if let Some(sku_id) = line.sku_id {
                if !catalog::restore_stock(sku_id, line.quantity, &mut *conn).await? {
                    warn!("🗃️ SKU #{sku_id} no longer exists. {} units could not be returned to stock", line.quantity);
                }
            }
        }
        Ok(())
    }

    async fn expire_payment(job: &PaymentTimeoutJob, pool: &SqlitePool) -> Result<Option<Vec<Order>>, PaymentError> {
        let payment_id = job.payment_id;
        let mut tx = pool.begin().await?;
        let failed =
            payments::transition_payment(payment_id, PaymentStatus::Pending, PaymentStatus::Failed, &mut tx).await?;
        let result = match failed {
            Some(_) => {
                let cancelled = orders::transition_orders_for_payment(
                    payment_id,
                    OrderStatusType::PendingPayment,
                    OrderStatusType::Cancelled,
                    &mut tx,
                )
                .await?;
                let ids = cancelled.iter().map(|o| o.id).collect::<Vec<_>>();
                Self::restore_order_stock(&ids, &mut tx).await?;
                info!("🗃️ Payment #{payment_id} expired. {} unpaid orders were cancelled", cancelled.len());
                Some(cancelled)
            },
            None => {
                debug!("🗃️ Payment #{payment_id} is no longer pending. Dropping its timeout job.");
                None
            },
        };
        jobs::remove_payment_timeout(payment_id, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }
}

impl CartManagement for SqliteDatabase {
    async fn validate_sku(
        &self,
        user_id: i64,
        sku_id: i64,
        quantity: i64,
        mode: ValidationMode,
    ) -> Result<Sku, CartError> {
        let mut tx = self.pool.begin().await?;
        let sku = Self::validate_sku_on(user_id, sku_id, quantity, mode, &mut tx).await?;
        tx.commit().await?;
        Ok(sku)
    }

    async fn add_cart_item(&self, user_id: i64, sku_id: i64, quantity: i64) -> Result<CartItem, CartError> {
        let mut tx = self.pool.begin().await?;
        catalog::lock_sku(sku_id, &mut tx).await?;
        Self::validate_sku_on(user_id, sku_id, quantity, ValidationMode::Create, &mut tx).await?;
        let item = cart::upsert_cart_item(user_id, sku_id, quantity, &mut tx).await?.ok_or_else(|| {
            CartError::InvalidQuantity(format!("The stock of SKU {sku_id} changed while it was being added"))
        })?;
        tx.commit().await?;
        debug!("🗃️ User #{user_id} now has {} of SKU #{sku_id} in cart item #{}", item.quantity, item.id);
        Ok(item)
    }

    async fn update_cart_item(
        &self,
        user_id: i64,
        cart_item_id: i64,
        sku_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartError> {
        let mut tx = self.pool.begin().await?;
        catalog::lock_sku(sku_id, &mut tx).await?;
        Self::validate_sku_on(user_id, sku_id, quantity, ValidationMode::Update, &mut tx).await?;
        let item = cart::update_cart_item(user_id, cart_item_id, sku_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn delete_cart_items(&self, user_id: i64, cart_item_ids: &[i64]) -> Result<u64, CartError> {
        let mut conn = self.pool.acquire().await?;
        let count = cart::delete_cart_items(user_id, cart_item_ids, &mut conn).await?;
        Ok(count)
    }

    async fn fetch_purchasable_cart_items(
        &self,
        user_id: i64,
        language: &LanguageFilter,
    ) -> Result<Vec<CartItemDetail>, CartError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut items = cart::fetch_cart_item_details(user_id, None, &mut tx)
            .await?
            .into_iter()
            .filter(|i| !i.sku.sku.is_deleted() && i.product().is_purchasable(now))
            .collect::<Vec<_>>();
        Self::attach_translations(&mut items, language, &mut tx).await?;
        tx.commit().await?;
        Ok(items)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_orders(
        &self,
        user_id: i64,
        checkout: &[ShopCheckout],
        payment_timeout: Duration,
    ) -> Result<CheckoutResult, OrderFlowError> {
        checkout::check_not_empty(checkout)?;
        let ids = checkout::requested_cart_item_ids(checkout);
        let mut tx = self.pool.begin().await?;
        // Creating the payment first takes the write lock, so everything read below is current until commit.
        let payment = payments::insert_payment(&mut tx).await?;
        let mut items = cart::fetch_cart_item_details(user_id, Some(&ids), &mut tx).await?;
        checkout::validate_checkout(checkout, &items, Utc::now())?;
        Self::attach_translations(&mut items, &LanguageFilter::All, &mut tx).await?;
        let by_id = items.iter().map(|i| (i.id(), i)).collect::<HashMap<_, _>>();

        let mut created = Vec::with_capacity(checkout.len());
        for group in checkout {
            let order = orders::insert_order(user_id, group.shop_id, payment.id, &group.receiver, &mut tx).await?;
            for id in &group.cart_item_ids {
                let item = by_id.get(id).ok_or(OrderFlowError::CartItemNotFound)?;
                let translations = item.sku.product.translations.iter().cloned().map(SnapshotTranslation::from);
                orders::insert_snapshot(order.id, item, translations.collect(), &mut tx).await?;
                orders::link_product(order.id, item.product().id, &mut tx).await?;
            }
            created.push(order);
        }

        let deleted = cart::delete_cart_items(user_id, &ids, &mut tx).await?;
        if deleted != ids.len() as u64 {
            warn!("🗃️ Only {deleted} of {} cart items could be consumed. Rolling back checkout.", ids.len());
            return Err(OrderFlowError::CartItemNotFound);
        }
        for item in &items {
            let sku_id = item.sku.sku.id;
            if !catalog::decrement_stock(sku_id, item.quantity(), &mut tx).await? {
                warn!("🗃️ SKU #{sku_id} ran out of stock during checkout. Rolling back.");
                return Err(OrderFlowError::OutOfStock(sku_id));
            }
        }
        jobs::schedule_payment_timeout(payment.id, Utc::now() + payment_timeout, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Checkout for user #{user_id} created {} orders under payment #{}", created.len(), payment.id);
        Ok(CheckoutResult { payment_id: payment.id, orders: created })
    }

    async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let Some(cancelled) = orders::cancel_order_for_user(order_id, user_id, &mut tx).await? else {
            let order = orders::fetch_order_for_user(order_id, user_id, &mut tx)
                .await?
                .ok_or(OrderFlowError::OrderNotFound(order_id))?;
            return Err(OrderFlowError::CannotCancelOrder { order_id, status: order.status });
        };
        Self::restore_order_stock(&[order_id], &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} cancelled by user #{user_id}");
        Ok(cancelled)
    }

    async fn search_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<(Vec<OrderWithItems>, i64), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let total = orders::count_orders(filter.clone(), &mut tx).await?;
        let found = orders::search_orders(filter, pagination, &mut tx).await?;
        let result = Self::attach_snapshots(found, &mut tx).await?;
        tx.commit().await?;
        Ok((result, total))
    }

    async fn fetch_order_for_user(
        &self,
        user_id: i64,
        order_id: i64,
    ) -> Result<Option<OrderWithItems>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_for_user(order_id, user_id, &mut tx).await?;
        let result = match order {
            Some(order) => Self::attach_snapshots(vec![order], &mut tx).await?.pop(),
            None => None,
        };
        tx.commit().await?;
        Ok(result)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// The transfer is recorded first. A replayed transfer fails right there and the transaction is rolled back.
    /// When the transfer cannot be matched, the transaction is committed anyway so that the record survives for
    /// manual investigation.
    async fn reconcile_transfer(&self, transfer: NewPaymentTransaction) -> Result<ReconcileOutcome, PaymentError> {
        let txid = transfer.id;
        let mut tx = self.pool.begin().await?;
        transfers::insert_transaction(&transfer, &mut tx).await?;
        match Self::settle_payment(&transfer, &mut tx).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            },
            Err(e) if e.is_rejection() => {
                tx.commit().await?;
                warn!("🗃️ Transfer {txid} was recorded but could not be matched to a payment. {e}");
                Err(e)
            },
            Err(e) => Err(e),
        }
    }

    async fn remove_payment_timeout(&self, payment_id: i64) -> Result<bool, PaymentError> {
        let mut conn = self.pool.acquire().await?;
        let removed = jobs::remove_payment_timeout(payment_id, &mut conn).await?;
        Ok(removed)
    }

    async fn expire_pending_payments(&self, now: DateTime<Utc>) -> Result<ExpiryResult, PaymentError> {
        let due = {
            let mut conn = self.pool.acquire().await?;
            jobs::fetch_due_jobs(now, &mut conn).await?
        };
        let mut result = ExpiryResult::default();
        for job in &due {
            if let Some(cancelled) = Self::expire_payment(job, &self.pool).await? {
                result.expired_payments.push(job.payment_id);
                result.cancelled_orders.extend(cancelled);
            }
        }
        Ok(result)
    }

    async fn fetch_payment(&self, payment_id: i64) -> Result<Option<PaymentWithOrders>, PaymentError> {
        let mut tx = self.pool.begin().await?;
        let payment = Self::fetch_payment_with_orders(payment_id, &mut tx).await?;
        tx.commit().await?;
        Ok(payment)
    }

    async fn fetch_payment_transaction(&self, id: i64) -> Result<Option<PaymentTransaction>, PaymentError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transfers::fetch_transaction(id, &mut conn).await?;
        Ok(transaction)
    }

    async fn fetch_payment_timeout(&self, payment_id: i64) -> Result<Option<PaymentTimeoutJob>, PaymentError> {
        let mut conn = self.pool.acquire().await?;
        let job = jobs::fetch_payment_timeout(payment_id, &mut conn).await?;
        Ok(job)
    }

    async fn close(&mut self) -> Result<(), PaymentError> {
        self.pool.close().await;
        Ok(())
    }
}
