use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Payment, PaymentStatus};

/// Creates a new `PENDING` payment.
pub async fn insert_payment(conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    let payment: Payment = sqlx::query_as("INSERT INTO payments (status) VALUES ($1) RETURNING *;")
        .bind(PaymentStatus::Pending)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Payment #{} created", payment.id);
    Ok(payment)
}

pub async fn fetch_payment(payment_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment =
        sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(payment_id).fetch_optional(conn).await?;
    Ok(payment)
}

/// Changes the payment status from `from` to `to`. Returns `None` if the payment was not in the `from` status, in
/// which case nothing is changed.
pub async fn transition_payment(
    payment_id: i64,
    from: PaymentStatus,
    to: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(payment_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}
