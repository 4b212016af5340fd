use std::{sync::Arc, time::Duration};

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use ecom_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CartApi,
    OrderFlowApi,
    PaymentApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    middleware::ApiKeyMiddlewareFactory,
    notifications::{payment_succeeded_hook, LogNotificationGateway, NotificationGateway},
    routes::{
        health,
        AddToCartRoute,
        CancelOrderRoute,
        CheckoutRoute,
        DeleteCartItemsRoute,
        MyCartRoute,
        MyOrderRoute,
        MyOrdersRoute,
        PaymentWebhookRoute,
        UpdateCartItemRoute,
        ValidateCartItemRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate database. {e}")))?;
    let gateway: Arc<dyn NotificationGateway> = Arc::new(LogNotificationGateway);
    let mut hooks = EventHooks::default();
    hooks.on_payment_succeeded(payment_succeeded_hook(gateway));
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let expiry_api = PaymentApi::new(db.clone(), producers.clone());
    let _worker = start_expiry_worker(expiry_api, config.expiry_interval);
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone());
        let orders_api =
            OrderFlowApi::new(db.clone(), producers.clone()).with_unpaid_order_timeout(config.unpaid_order_timeout);
        let payment_api = PaymentApi::new(db.clone(), producers.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ecom::access_log"))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payment_api))
            .app_data(web::Data::new(config.options.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config());
        // Routes acting on behalf of the user named by the upstream authentication layer
        let api_scope = web::scope("/api")
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(AddToCartRoute::<SqliteDatabase>::new())
            .service(ValidateCartItemRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(DeleteCartItemsRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(MyOrderRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new());
        let webhook_scope = web::scope("/webhooks")
            .wrap(ApiKeyMiddlewareFactory::new(config.payment_api_key.clone(), config.api_key_checks))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same JSON error body as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Could not read request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        debug!("💻️ Could not read request query. {err}");
        ServerError::InvalidRequestQuery(err.to_string()).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        debug!("💻️ Could not read request path. {err}");
        ServerError::InvalidRequestPath(err.to_string()).into()
    })
}
