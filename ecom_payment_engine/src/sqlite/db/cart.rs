use log::debug;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use super::push_id_list;
use crate::{
    db_types::{CartItem, Product, ShopSummary, Sku},
    traits::{CartError, CartItemDetail, ProductDetail, SkuDetail},
};

const CART_DETAIL_QUERY: &str = r#"
    SELECT
        ci.id AS ci_id, ci.user_id AS ci_user_id, ci.sku_id AS ci_sku_id, ci.quantity AS ci_quantity,
        ci.created_at AS ci_created_at, ci.updated_at AS ci_updated_at,
        s.id AS s_id, s.product_id AS s_product_id, s.created_by_id AS s_created_by_id, s.value AS s_value,
        s.price AS s_price, s.stock AS s_stock, s.image AS s_image, s.deleted_at AS s_deleted_at,
        s.created_at AS s_created_at, s.updated_at AS s_updated_at,
        p.id AS p_id, p.name AS p_name, p.published_at AS p_published_at, p.created_by_id AS p_created_by_id,
        p.deleted_at AS p_deleted_at, p.created_at AS p_created_at, p.updated_at AS p_updated_at,
        u.id AS u_id, u.name AS u_name, u.avatar AS u_avatar
    FROM cart_items ci
    JOIN skus s ON s.id = ci.sku_id
    JOIN products p ON p.id = s.product_id
    JOIN users u ON u.id = s.created_by_id
    WHERE ci.user_id = "#;

impl FromRow<'_, SqliteRow> for CartItemDetail {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let item = CartItem {
            id: row.try_get("ci_id")?,
            user_id: row.try_get("ci_user_id")?,
            sku_id: row.try_get("ci_sku_id")?,
            quantity: row.try_get("ci_quantity")?,
            created_at: row.try_get("ci_created_at")?,
            updated_at: row.try_get("ci_updated_at")?,
        };
        let sku = Sku {
            id: row.try_get("s_id")?,
            product_id: row.try_get("s_product_id")?,
            created_by_id: row.try_get("s_created_by_id")?,
            value: row.try_get("s_value")?,
            price: row.try_get("s_price")?,
            stock: row.try_get("s_stock")?,
            image: row.try_get("s_image")?,
            deleted_at: row.try_get("s_deleted_at")?,
            created_at: row.try_get("s_created_at")?,
            updated_at: row.try_get("s_updated_at")?,
        };
        let product = Product {
            id: row.try_get("p_id")?,
            name: row.try_get("p_name")?,
            published_at: row.try_get("p_published_at")?,
            created_by_id: row.try_get("p_created_by_id")?,
            deleted_at: row.try_get("p_deleted_at")?,
            created_at: row.try_get("p_created_at")?,
            updated_at: row.try_get("p_updated_at")?,
        };
        let shop =
            ShopSummary { id: row.try_get("u_id")?, name: row.try_get("u_name")?, avatar: row.try_get("u_avatar")? };
        let product = ProductDetail { product, translations: Vec::new() };
        Ok(Self { item, sku: SkuDetail { sku, product }, shop })
    }
}

/// Fetches the user's cart items together with their SKU, product and shop, most recently updated first.
/// If `ids` is given, only those cart items are returned. Translations are not filled in.
pub async fn fetch_cart_item_details(
    user_id: i64,
    ids: Option<&[i64]>,
    conn: &mut SqliteConnection,
) -> Result<Vec<CartItemDetail>, sqlx::Error> {
    let mut builder = QueryBuilder::new(CART_DETAIL_QUERY);
    builder.push_bind(user_id);
    if let Some(ids) = ids {
        builder.push(" AND ci.id IN ");
        push_id_list(&mut builder, ids);
    }
    builder.push(" ORDER BY ci.updated_at DESC, ci.id DESC");
    let items = builder.build_query_as::<CartItemDetail>().fetch_all(conn).await?;
    Ok(items)
}

pub async fn fetch_cart_item_for_sku(
    user_id: i64,
    sku_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartItem>, sqlx::Error> {
    let item = sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND sku_id = $2")
        .bind(user_id)
        .bind(sku_id)
        .fetch_optional(conn)
        .await?;
    Ok(item)
}

/// Adds `quantity` of the SKU to the user's cart, or increments the existing cart item.
///
/// The write is conditional on the resulting quantity still fitting in the SKU's stock. `None` is returned when it
/// does not, which can only happen if the stock changed after it was validated.
pub async fn upsert_cart_item(
    user_id: i64,
    sku_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartItem>, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO cart_items (user_id, sku_id, quantity) VALUES ($1, $2, $3)
            ON CONFLICT (user_id, sku_id) DO UPDATE SET
                quantity = cart_items.quantity + excluded.quantity,
                updated_at = CURRENT_TIMESTAMP
            WHERE cart_items.quantity + excluded.quantity <= (SELECT stock FROM skus WHERE id = excluded.sku_id)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(sku_id)
    .bind(quantity)
    .fetch_optional(conn)
    .await?;
    Ok(item)
}

/// Overwrites the SKU and quantity of one of the user's cart items. Returns `NotFound` if the cart item does not
/// belong to the user.
pub async fn update_cart_item(
    user_id: i64,
    cart_item_id: i64,
    sku_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<CartItem, CartError> {
    let item = sqlx::query_as(
        r#"
            UPDATE cart_items SET sku_id = $1, quantity = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND user_id = $4
            RETURNING *;
        "#,
    )
    .bind(sku_id)
    .bind(quantity)
    .bind(cart_item_id)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => CartError::NotFound(cart_item_id),
        sqlx::Error::Database(err) if err.is_unique_violation() => CartError::SkuAlreadyInCart(sku_id),
        _ => CartError::from(e),
    })?;
    Ok(item)
}

/// Deletes the user's cart items with the given ids. Ids that do not exist, or belong to someone else, are ignored.
/// Returns the number of rows deleted.
pub async fn delete_cart_items(user_id: i64, ids: &[i64], conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    if ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("DELETE FROM cart_items WHERE user_id = ");
    builder.push_bind(user_id);
    builder.push(" AND id IN ");
    push_id_list(&mut builder, ids);
    let result = builder.build().execute(conn).await?;
    debug!("🗃️ Deleted {} of {} cart items for user #{user_id}", result.rows_affected(), ids.len());
    Ok(result.rows_affected())
}
