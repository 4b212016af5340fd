//! Pushes payment results to the buyer's browser.
//!
//! The push transport itself (a websocket server, a push service) lives outside this server. It is reached through the
//! [`NotificationGateway`] trait. Every user has their own channel, `userId-{user_id}`, and a settled payment publishes
//! `{"status": "success"}` on it.
use std::sync::Arc;

use ecom_payment_engine::events::PaymentSucceededEvent;
use futures::future::BoxFuture;
use log::*;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Could not deliver notification on channel {channel}. {reason}")]
pub struct NotificationError {
    pub channel: String,
    pub reason: String,
}

pub trait NotificationGateway: Send + Sync {
    fn publish(&self, channel: String, payload: Value) -> BoxFuture<'static, Result<(), NotificationError>>;
}

/// A gateway that only writes the notification to the log. Used when no push transport is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationGateway;

impl NotificationGateway for LogNotificationGateway {
    fn publish(&self, channel: String, payload: Value) -> BoxFuture<'static, Result<(), NotificationError>> {
        Box::pin(async move {
            info!("📬️ [{channel}] {payload}");
            Ok(())
        })
    }
}

pub fn user_channel(user_id: i64) -> String {
    format!("userId-{user_id}")
}

pub fn payment_success_payload() -> Value {
    json!({ "status": "success" })
}

/// Builds the `PaymentSucceeded` hook that tells the buyer their transfer arrived. Delivery failures are logged and
/// dropped, since the payment has already been settled.
pub fn payment_succeeded_hook(
    gateway: Arc<dyn NotificationGateway>,
) -> impl Fn(PaymentSucceededEvent) -> BoxFuture<'static, ()> + Send + Sync + 'static {
    move |event: PaymentSucceededEvent| -> BoxFuture<'static, ()> {
        let gateway = Arc::clone(&gateway);
        Box::pin(async move {
            let channel = user_channel(event.user_id);
            debug!("📬️ Notifying {channel} that payment #{} succeeded", event.payment_id);
            if let Err(e) = gateway.publish(channel, payment_success_payload()).await {
                warn!("📬️ Payment #{} succeeded, but the buyer was not told. {e}", event.payment_id);
            }
        })
    }
}
