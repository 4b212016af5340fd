use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::NewPaymentTransaction,
    ecom_api::payment_objects::BankTransferWebhook,
    events::{CancellationReason, EventProducers, OrderCancelledEvent, PaymentSucceededEvent},
    traits::{ExpiryResult, PaymentError, PaymentGatewayDatabase, ReconcileOutcome},
};

/// `PaymentApi` matches incoming bank transfers with payments, and closes payments whose transfer never arrives.
pub struct PaymentApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for PaymentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B> PaymentApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> PaymentApi<B>
where B: PaymentGatewayDatabase
{
    /// Handles a bank gateway webhook. See [`Self::reconcile`].
    pub async fn process_webhook(&self, hook: BankTransferWebhook) -> Result<ReconcileOutcome, PaymentError> {
        let transfer = NewPaymentTransaction::try_from(hook)?;
        self.reconcile(transfer).await
    }

    /// Records the bank transfer, and if it pays for a payment in full, settles the payment.
    ///
    /// Once the settlement is committed, the payment's timeout job is removed and the `PaymentSucceeded` hook is
    /// notified. Failing to remove the job is logged, but does not undo the settlement, since the expiry run leaves
    /// settled payments alone.
    pub async fn reconcile(&self, transfer: NewPaymentTransaction) -> Result<ReconcileOutcome, PaymentError> {
        let txid = transfer.id;
        trace!("🔄️💰️ Reconciling bank transaction {txid} for {}", transfer.transfer_amount);
        let outcome = match self.db.reconcile_transfer(transfer).await {
            Ok(outcome) => outcome,
            Err(PaymentError::DuplicateTransaction(id)) => {
                info!("🔄️💰️ Bank transaction {id} has already been processed. Ignoring the replay.");
                return Err(PaymentError::DuplicateTransaction(id));
            },
            Err(e @ PaymentError::AmountMismatch { .. }) | Err(e @ PaymentError::PaymentNotFound(_)) => {
                error!("🔄️💰️ Bank transaction {txid} needs manual investigation. {e}");
                return Err(e);
            },
            Err(e) => {
                warn!("🔄️💰️ Bank transaction {txid} could not be reconciled. {e}");
                return Err(e);
            },
        };
        if let ReconcileOutcome::Paid(settlement) = &outcome {
            let payment_id = settlement.payment_id;
            match self.db.remove_payment_timeout(payment_id).await {
                Ok(true) => trace!("🔄️💰️ Timeout job for payment #{payment_id} removed"),
                Ok(false) => debug!("🔄️💰️ Payment #{payment_id} had no timeout job"),
                Err(e) => warn!("🔄️💰️ Could not remove the timeout job for payment #{payment_id}. {e}"),
            }
            info!(
                "🔄️💰️ Payment #{payment_id} paid by bank transaction {txid}. {} orders for user #{} move to pickup",
                settlement.orders.len(),
                settlement.user_id
            );
            let order_ids = settlement.orders.iter().map(|o| o.id).collect();
            let event = PaymentSucceededEvent::new(payment_id, settlement.user_id, order_ids);
            self.producers.publish_payment_succeeded(event).await;
        }
        Ok(outcome)
    }

    /// Fails every pending payment whose timeout is due at `now`, cancelling its unpaid orders.
    pub async fn expire_pending_payments(&self, now: DateTime<Utc>) -> Result<ExpiryResult, PaymentError> {
        let result = self.db.expire_pending_payments(now).await?;
        if !result.is_empty() {
            info!(
                "🔄️💰️ {} payments expired and {} orders were cancelled",
                result.expired_payments.len(),
                result.cancelled_orders.len()
            );
        }
        for order in &result.cancelled_orders {
            let event = OrderCancelledEvent::new(order.clone(), CancellationReason::PaymentExpired);
            self.producers.publish_order_cancelled(event).await;
        }
        Ok(result)
    }
}
