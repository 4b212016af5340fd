use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentTransaction, PaymentTransaction},
    traits::PaymentError,
};

/// Records a bank transfer. The bank's transaction id is the primary key, so recording the same transfer twice fails
/// with [`PaymentError::DuplicateTransaction`].
pub async fn insert_transaction(
    transfer: &NewPaymentTransaction,
    conn: &mut SqliteConnection,
) -> Result<PaymentTransaction, PaymentError> {
    let id = transfer.id;
    let transaction = sqlx::query_as(
        r#"
            INSERT INTO payment_transactions (
                id,
                gateway,
                transaction_date,
                account_number,
                sub_account,
                amount_in,
                amount_out,
                accumulated,
                code,
                transaction_content,
                reference_number,
                body
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(transfer.gateway.as_str())
    .bind(transfer.transaction_date)
    .bind(transfer.account_number.as_deref())
    .bind(transfer.sub_account.as_deref())
    .bind(transfer.amount_in())
    .bind(transfer.amount_out())
    .bind(transfer.accumulated)
    .bind(transfer.code.as_deref())
    .bind(transfer.content.as_deref())
    .bind(transfer.reference_number.as_deref())
    .bind(transfer.description.as_deref())
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => PaymentError::DuplicateTransaction(id),
        _ => PaymentError::from(e),
    })?;
    debug!("🗃️ Bank transaction {id} recorded");
    Ok(transaction)
}

pub async fn fetch_transaction(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentTransaction>, sqlx::Error> {
    let transaction =
        sqlx::query_as("SELECT * FROM payment_transactions WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(transaction)
}
