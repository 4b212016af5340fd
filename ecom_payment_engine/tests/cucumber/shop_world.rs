use std::collections::HashMap;

use cucumber::World;
use ecom_payment_engine::{
    events::EventProducers,
    order_objects::CheckoutResult,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    CartApi,
    OrderFlowApi,
    OrderFlowError,
    PaymentApi,
    PaymentError,
    PaymentGatewayDatabase,
    ReconcileOutcome,
    SqliteDatabase,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct ShopWorld {
    pub system: Option<ShopSystem>,
    /// User ids, by name
    pub users: HashMap<String, i64>,
    /// SKU ids, by product name
    pub skus: HashMap<String, i64>,
    pub checkout: Option<Result<CheckoutResult, OrderFlowError>>,
    pub reconciliation: Option<Result<ReconcileOutcome, PaymentError>>,
}

#[derive(Debug)]
pub struct ShopSystem {
    pub db_path: String,
    pub cart: CartApi<SqliteDatabase>,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub payments: PaymentApi<SqliteDatabase>,
}

impl ShopWorld {
    pub fn system(&self) -> &ShopSystem {
        self.system.as_ref().expect("Shop system not initialised")
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.system().payments.db()
    }

    pub fn user(&self, name: &str) -> i64 {
        *self.users.get(name).unwrap_or_else(|| panic!("Unknown user '{name}'"))
    }

    pub fn sku(&self, product: &str) -> i64 {
        *self.skus.get(product).unwrap_or_else(|| panic!("Unknown product '{product}'"))
    }

    pub fn last_checkout(&self) -> &CheckoutResult {
        match &self.checkout {
            Some(Ok(result)) => result,
            other => panic!("Expected a successful checkout, got {other:?}"),
        }
    }
}

impl ShopSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 2).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let cart = CartApi::new(db.clone());
        let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
        let payments = PaymentApi::new(db, EventProducers::default());
        Self { db_path: url, cart, orders, payments }
    }

    pub async fn close(&mut self) {
        if let Err(e) = self.payments.db_mut().close().await {
            error!("🚀️ Failed to close database: {e}");
        }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
