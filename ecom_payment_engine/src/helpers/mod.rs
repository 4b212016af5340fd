mod payment_code;
mod transaction_date;

pub use payment_code::{extract_payment_id, parse_payment_code, PaymentCodeError, PAYMENT_CODE_PREFIX};
pub use transaction_date::{parse_transaction_date, TRANSACTION_DATE_FORMAT};
