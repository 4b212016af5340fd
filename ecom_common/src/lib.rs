pub mod helpers;
mod money;
pub mod op;
mod secret;

pub use money::{Money, MoneyConversionError, SHOP_CURRENCY_CODE};
pub use secret::Secret;
