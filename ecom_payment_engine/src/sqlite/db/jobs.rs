//! Timeout jobs for payments that are waiting for a bank transfer.
use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::PaymentTimeoutJob;

/// Schedules the timeout for the payment at `run_at`. Rescheduling an existing job moves its run time.
pub async fn schedule_payment_timeout(
    payment_id: i64,
    run_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<PaymentTimeoutJob, sqlx::Error> {
    let job = sqlx::query_as(
        r#"
            INSERT INTO payment_timeout_jobs (payment_id, run_at) VALUES ($1, $2)
            ON CONFLICT (payment_id) DO UPDATE SET run_at = excluded.run_at
            RETURNING *;
        "#,
    )
    .bind(payment_id)
    .bind(run_at)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Timeout for payment #{payment_id} scheduled at {run_at}");
    Ok(job)
}

/// Removes the payment's timeout job. Returns `false` if there was none.
pub async fn remove_payment_timeout(payment_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM payment_timeout_jobs WHERE payment_id = $1").bind(payment_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_payment_timeout(
    payment_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentTimeoutJob>, sqlx::Error> {
    let job = sqlx::query_as("SELECT * FROM payment_timeout_jobs WHERE payment_id = $1")
        .bind(payment_id)
        .fetch_optional(conn)
        .await?;
    Ok(job)
}

/// Fetches the jobs that are due to run at `now`, oldest first.
pub async fn fetch_due_jobs(
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentTimeoutJob>, sqlx::Error> {
    let jobs = sqlx::query_as(
        "SELECT * FROM payment_timeout_jobs WHERE julianday(run_at) <= julianday($1) ORDER BY julianday(run_at)",
    )
    .bind(now)
    .fetch_all(conn)
    .await?;
    Ok(jobs)
}
