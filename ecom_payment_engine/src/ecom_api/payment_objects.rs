use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Money, NewPaymentTransaction, TransferType},
    helpers::parse_transaction_date,
    traits::PaymentError,
};

/// The transfer notification posted by the bank gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferWebhook {
    pub id: i64,
    pub gateway: String,
    /// `yyyy-MM-dd HH:mm:ss`
    pub transaction_date: String,
    pub account_number: Option<String>,
    pub code: Option<String>,
    pub content: Option<String>,
    pub transfer_type: TransferType,
    pub transfer_amount: i64,
    #[serde(default)]
    pub accumulated: i64,
    pub sub_account: Option<String>,
    pub reference_code: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<BankTransferWebhook> for NewPaymentTransaction {
    type Error = PaymentError;

    fn try_from(hook: BankTransferWebhook) -> Result<Self, Self::Error> {
        let transaction_date = parse_transaction_date(&hook.transaction_date)
            .map_err(|e| PaymentError::InvalidTransactionDate(format!("'{}': {e}", hook.transaction_date)))?;
        Ok(Self {
            id: hook.id,
            gateway: hook.gateway,
            transaction_date,
            account_number: hook.account_number,
            sub_account: hook.sub_account,
            transfer_type: hook.transfer_type,
            transfer_amount: Money::from(hook.transfer_amount),
            accumulated: Money::from(hook.accumulated),
            code: hook.code,
            content: hook.content,
            reference_number: hook.reference_code,
            description: hook.description,
        })
    }
}
