use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use super::push_id_list;
use crate::{
    db_types::{Product, ProductTranslation, Sku},
    ecom_api::query_objects::LanguageFilter,
};

/// Fetches the SKU, including soft-deleted SKUs.
pub async fn fetch_sku(sku_id: i64, conn: &mut SqliteConnection) -> Result<Option<Sku>, sqlx::Error> {
    let sku = sqlx::query_as("SELECT * FROM skus WHERE id = $1").bind(sku_id).fetch_optional(conn).await?;
    Ok(sku)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Fetches the live translations of the given products, optionally restricted to one language.
pub async fn fetch_translations(
    product_ids: &[i64],
    language: &LanguageFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductTranslation>, sqlx::Error> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new(
        "SELECT id, product_id, language_id, name, description FROM product_translations WHERE deleted_at IS NULL AND \
         product_id IN ",
    );
    push_id_list(&mut builder, product_ids);
    if let Some(lang) = language.language_id() {
        builder.push(" AND language_id = ");
        builder.push_bind(lang.to_string());
    }
    builder.push(" ORDER BY product_id, id");
    let translations = builder.build_query_as::<ProductTranslation>().fetch_all(conn).await?;
    trace!("🗃️ Fetched {} translations for {} products", translations.len(), product_ids.len());
    Ok(translations)
}

/// Takes `quantity` units out of the SKU's stock, if there are that many. Returns `false` if the SKU does not exist,
/// has been deleted, or does not have enough stock. The stock is never driven below zero.
pub async fn decrement_stock(sku_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE skus SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND deleted_at IS NULL AND stock >= $1
        "#,
    )
    .bind(quantity)
    .bind(sku_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Puts `quantity` units back into the SKU's stock. Returns `false` if the SKU no longer exists.
pub async fn restore_stock(sku_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE skus SET stock = stock + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(quantity)
            .bind(sku_id)
            .execute(conn)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Touches the SKU row so that the surrounding transaction holds the write lock before it reads the SKU, its product
/// or the cart. Matching no row is fine; the lock is taken either way.
pub async fn lock_sku(sku_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE skus SET updated_at = updated_at WHERE id = $1").bind(sku_id).execute(conn).await?;
    Ok(())
}
