use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// The format bank gateways use for `transactionDate`, e.g. `2024-03-25 14:02:37`.
pub const TRANSACTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a gateway transaction date. The gateway does not send a zone, so the value is stored as UTC.
pub fn parse_transaction_date(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), TRANSACTION_DATE_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}
