use std::env;

use chrono::Duration;
use ecom_common::{helpers::parse_boolean_flag, Secret};
use ecom_payment_engine::ecom_api::order_flow_api::DEFAULT_UNPAID_ORDER_TIMEOUT_HOURS;
use log::*;

const DEFAULT_ECOM_HOST: &str = "127.0.0.1";
const DEFAULT_ECOM_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/ecom_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_LANGUAGE_HEADER: &str = "accept-language";
const DEFAULT_EXPIRY_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// The key the bank gateway must present as `Authorization: Apikey <key>` when calling the payment webhook.
    pub payment_api_key: Secret<String>,
    /// If false, payment webhooks are accepted without checking the API key. **DANGER**
    pub api_key_checks: bool,
    /// The time an unpaid checkout is held before its orders are cancelled and the stock released.
    pub unpaid_order_timeout: Duration,
    /// How often the expiry worker looks for unpaid checkouts whose time is up.
    pub expiry_interval: std::time::Duration,
    pub options: ServerOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ECOM_HOST.to_string(),
            port: DEFAULT_ECOM_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            payment_api_key: Secret::default(),
            api_key_checks: true,
            unpaid_order_timeout: Duration::hours(DEFAULT_UNPAID_ORDER_TIMEOUT_HOURS),
            expiry_interval: DEFAULT_EXPIRY_INTERVAL,
            options: ServerOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ECOM_HOST").ok().unwrap_or_else(|| DEFAULT_ECOM_HOST.into());
        let port = env::var("ECOM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for ECOM_PORT. {e} Using the default, {DEFAULT_ECOM_PORT}, instead."
                    );
                    DEFAULT_ECOM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_ECOM_PORT);
        let database_url = env::var("ECOM_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ ECOM_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_connections = parse_number("ECOM_DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let api_key_checks = parse_boolean_flag(env::var("ECOM_PAYMENT_API_KEY_CHECKS").ok(), true);
        let payment_api_key = Secret::new(env::var("ECOM_PAYMENT_API_KEY").ok().unwrap_or_else(|| {
            if api_key_checks {
                error!(
                    "🪛️ ECOM_PAYMENT_API_KEY is not set. Every payment webhook will be rejected until it is set to \
                     the key configured at the bank gateway."
                );
            }
            String::default()
        }));
        if !api_key_checks {
            warn!("🚨️ Payment webhook API key checks are DISABLED. Anyone can mark a payment as paid. 🚨️");
        }
        let unpaid_order_timeout = configure_unpaid_order_timeout();
        let interval_secs = parse_number("ECOM_EXPIRY_INTERVAL_SECS", DEFAULT_EXPIRY_INTERVAL.as_secs());
        let expiry_interval = std::time::Duration::from_secs(interval_secs);
        let options = ServerOptions::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_connections,
            payment_api_key,
            api_key_checks,
            unpaid_order_timeout,
            expiry_interval,
            options,
        }
    }
}

fn parse_number<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name}. {e} Using the default, {default}.");
            default
        }),
        Err(_) => default,
    }
}

fn configure_unpaid_order_timeout() -> Duration {
    env::var("ECOM_UNPAID_ORDER_TIMEOUT")
        .map_err(|_| {
            info!("🪛️ ECOM_UNPAID_ORDER_TIMEOUT is not set. Using the default of {DEFAULT_UNPAID_ORDER_TIMEOUT_HOURS} hrs.")
        })
        .and_then(|s| {
            s.parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .map(Duration::hours)
                .ok_or_else(|| warn!("🪛️ Invalid configuration value for ECOM_UNPAID_ORDER_TIMEOUT: {s}"))
        })
        .ok()
        .unwrap_or(Duration::hours(DEFAULT_UNPAID_ORDER_TIMEOUT_HOURS))
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that request handlers need. It holds no secrets, so it can be shared with
/// every worker as app data.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// The header the upstream authentication layer uses to pass on the id of the signed-in user.
    pub user_id_header: String,
    /// The header that selects the language of product translations. A missing header, or `all`, selects every
    /// language.
    pub language_header: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { user_id_header: DEFAULT_USER_ID_HEADER.into(), language_header: DEFAULT_LANGUAGE_HEADER.into() }
    }
}

impl ServerOptions {
    pub fn from_env_or_default() -> Self {
        let user_id_header = env::var("ECOM_USER_ID_HEADER").ok().unwrap_or_else(|| DEFAULT_USER_ID_HEADER.into());
        let language_header =
            env::var("ECOM_LANGUAGE_HEADER").ok().unwrap_or_else(|| DEFAULT_LANGUAGE_HEADER.into());
        debug!("🪛️ Reading user ids from '{user_id_header}' and languages from '{language_header}'");
        Self { user_id_header, language_header }
    }
}
