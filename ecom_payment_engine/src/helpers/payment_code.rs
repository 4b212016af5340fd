//! Bank transfer memos carry the payment being paid for as a short code: the literal `DH` followed immediately by the
//! decimal payment id, e.g. `DH000123`. Leading zeros are allowed.
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const PAYMENT_CODE_PREFIX: &str = "DH";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentCodeError {
    #[error("The transfer carries neither a payment code nor any content")]
    Missing,
    #[error("No payment code ({PAYMENT_CODE_PREFIX} followed by digits) was found in '{0}'")]
    NoPaymentCode(String),
    #[error("The payment id in '{0}' is out of range")]
    OutOfRange(String),
}

fn payment_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"{}(\d+)", regex::escape(PAYMENT_CODE_PREFIX));
        Regex::new(&pattern).expect("payment code regex is valid")
    })
}

/// Finds the first payment code in `text` and returns the payment id it names.
pub fn parse_payment_code(text: &str) -> Result<i64, PaymentCodeError> {
    let digits = payment_code_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| PaymentCodeError::NoPaymentCode(text.to_string()))?;
    digits.as_str().parse::<i64>().map_err(|_| PaymentCodeError::OutOfRange(text.to_string()))
}

/// Extracts the payment id from a bank transfer.
///
/// The gateway's structured `code` field is tried first. If it is absent, blank or does not hold a payment code, the
/// free-text `content` is searched instead.
pub fn extract_payment_id(code: Option<&str>, content: Option<&str>) -> Result<i64, PaymentCodeError> {
    let code = code.map(str::trim).filter(|s| !s.is_empty());
    let content = content.map(str::trim).filter(|s| !s.is_empty());
    match (code, content) {
        (None, None) => Err(PaymentCodeError::Missing),
        (Some(code), None) => parse_payment_code(code),
        (None, Some(content)) => parse_payment_code(content),
        (Some(code), Some(content)) => match parse_payment_code(code) {
            Ok(id) => Ok(id),
            Err(PaymentCodeError::NoPaymentCode(_)) => parse_payment_code(content),
            Err(e) => Err(e),
        },
    }
}
