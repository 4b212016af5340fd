use std::time::Duration;

use chrono::Utc;
use ecom_payment_engine::{db_types::Order, PaymentApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the expiry worker. Every `interval`, pending payments whose timeout job is due are failed, and their unpaid
/// orders cancelled. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_expiry_worker(api: PaymentApi<SqliteDatabase>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Unpaid order expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running unpaid order expiry job");
            match api.expire_pending_payments(Utc::now()).await {
                Ok(result) if result.is_empty() => trace!("🕰️ No payments expired"),
                Ok(result) => {
                    info!("🕰️ {} payments expired", result.expired_payments.len());
                    debug!("🕰️ Cancelled orders: {}", order_list(&result.cancelled_orders));
                },
                Err(e) => {
                    error!("🕰️ Error running unpaid order expiry job: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] payment: DH{} user: {}", o.id, o.payment_id, o.user_id))
        .collect::<Vec<String>>()
        .join(", ")
}
