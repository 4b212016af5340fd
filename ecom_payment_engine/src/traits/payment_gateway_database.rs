use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{Money, NewPaymentTransaction, PaymentTimeoutJob, PaymentTransaction},
    traits::data_objects::{ExpiryResult, PaymentWithOrders, ReconcileOutcome},
};

/// This trait defines the behaviour for backends that reconcile incoming bank transfers with payments.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a bank transfer notification, and in a single atomic transaction,
    /// * records the transfer. If the transfer id has been seen before, `DuplicateTransaction` is returned and nothing
    ///   else happens.
    /// * finds the payment named by the transfer's payment code.
    /// * checks that the amount matches the payment total exactly.
    /// * marks the payment as `SUCCESS`, and its orders as `PENDING_PICKUP`.
    ///
    /// If the payment code is malformed, the payment does not exist or the amount does not match, the transfer record
    /// is kept for manual investigation and the corresponding error is returned.
    async fn reconcile_transfer(&self, transfer: NewPaymentTransaction) -> Result<ReconcileOutcome, PaymentError>;

    /// Removes the timeout job for the payment. Returns `false` if there was no job.
    async fn remove_payment_timeout(&self, payment_id: i64) -> Result<bool, PaymentError>;

    /// Fails every payment whose timeout job is due at `now` and is still `PENDING`. The payment's unpaid orders are
    /// cancelled and their stock is returned to the SKUs.
    async fn expire_pending_payments(&self, now: DateTime<Utc>) -> Result<ExpiryResult, PaymentError>;

    async fn fetch_payment(&self, payment_id: i64) -> Result<Option<PaymentWithOrders>, PaymentError>;

    async fn fetch_payment_transaction(&self, id: i64) -> Result<Option<PaymentTransaction>, PaymentError>;

    async fn fetch_payment_timeout(&self, payment_id: i64) -> Result<Option<PaymentTimeoutJob>, PaymentError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Bank transaction {0} has already been recorded")]
    DuplicateTransaction(i64),
    #[error("The transfer does not carry a valid payment code. {0}")]
    MalformedReference(String),
    #[error("Payment {0} does not exist")]
    PaymentNotFound(i64),
    #[error("Payment {payment_id} expects {expected}, but the transfer was for {received}")]
    AmountMismatch { payment_id: i64, expected: Money, received: Money },
    #[error("Payment {0} has already failed and cannot be paid")]
    PaymentClosed(i64),
    #[error("Invalid transaction date: {0}")]
    InvalidTransactionDate(String),
}

impl PaymentError {
    /// Rejections are transfers that were recorded but could not be matched to a payment. They need a human to look at
    /// them, but retrying the delivery will not help.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PaymentError::MalformedReference(_)
                | PaymentError::PaymentNotFound(_)
                | PaymentError::AmountMismatch { .. }
                | PaymentError::PaymentClosed(_)
        )
    }
}

impl From<sqlx::Error> for PaymentError {
    fn from(e: sqlx::Error) -> Self {
        PaymentError::DatabaseError(e.to_string())
    }
}
