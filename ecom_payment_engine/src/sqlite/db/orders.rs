use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, Sqlite, SqliteConnection};

use super::push_id_list;
use crate::{
    db_types::{Order, OrderStatusType, ProductSkuSnapshot, Receiver, SnapshotTranslation},
    ecom_api::{order_objects::OrderQueryFilter, query_objects::Pagination},
    traits::CartItemDetail,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    user_id: i64,
    shop_id: i64,
    payment_id: i64,
    receiver: &Receiver,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (user_id, status, receiver, shop_id, payment_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $1)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(OrderStatusType::PendingPayment)
    .bind(Json(receiver))
    .bind(shop_id)
    .bind(payment_id)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} for shop #{shop_id} inserted under payment #{payment_id}", order.id);
    Ok(order)
}

/// Copies the cart item's product and SKU details into an order line.
pub async fn insert_snapshot(
    order_id: i64,
    item: &CartItemDetail,
    translations: Vec<SnapshotTranslation>,
    conn: &mut SqliteConnection,
) -> Result<ProductSkuSnapshot, sqlx::Error> {
    let sku = &item.sku.sku;
    let product = item.product();
    let snapshot = sqlx::query_as(
        r#"
            INSERT INTO product_sku_snapshots (
                order_id,
                product_id,
                product_name,
                product_translations,
                sku_id,
                sku_value,
                sku_price,
                image,
                quantity
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(product.id)
    .bind(product.name.as_str())
    .bind(Json(translations))
    .bind(sku.id)
    .bind(sku.value.as_str())
    .bind(sku.price)
    .bind(sku.image.as_str())
    .bind(item.quantity())
    .fetch_one(conn)
    .await?;
    Ok(snapshot)
}

pub async fn link_product(order_id: i64, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO order_products (order_id, product_id) VALUES ($1, $2)")
        .bind(order_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_order_for_user(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_orders_for_payment(payment_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE payment_id = $1 AND deleted_at IS NULL ORDER BY id")
        .bind(payment_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Cancels the user's order if it is still waiting for payment, stamping `updated_by_id` with the user. Returns
/// `None` if the order does not exist, belongs to someone else, or has moved on from `PENDING_PAYMENT`. Since the
/// status check is part of the write, two concurrent cancellations cannot both succeed.
pub async fn cancel_order_for_user(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_by_id = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND user_id = $2 AND status = $4 AND deleted_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(OrderStatusType::Cancelled)
    .bind(user_id)
    .bind(order_id)
    .bind(OrderStatusType::PendingPayment)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Moves every order of the payment that has the `from` status into the `to` status. Returns the changed orders.
pub async fn transition_orders_for_payment(
    payment_id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE payment_id = $2 AND status = $3 AND deleted_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(payment_id)
    .bind(from)
    .fetch_all(conn)
    .await?;
    trace!("🗃️ {} orders of payment #{payment_id} moved from {from} to {to}", orders.len());
    Ok(orders)
}

pub async fn fetch_snapshots(
    order_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductSkuSnapshot>, sqlx::Error> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM product_sku_snapshots WHERE order_id IN ");
    push_id_list(&mut builder, order_ids);
    builder.push(" ORDER BY order_id, id");
    let snapshots = builder.build_query_as::<ProductSkuSnapshot>().fetch_all(conn).await?;
    Ok(snapshots)
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: OrderQueryFilter) {
    builder.push(" WHERE 1 = 1");
    if !filter.include_deleted {
        builder.push(" AND deleted_at IS NULL");
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(payment_id) = filter.payment_id {
        builder.push(" AND payment_id = ");
        builder.push_bind(payment_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}

/// Fetches a page of orders matching the filter, newest first.
pub async fn search_orders(
    filter: OrderQueryFilter,
    pagination: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(pagination.limit());
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

pub async fn count_orders(filter: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filter(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}
