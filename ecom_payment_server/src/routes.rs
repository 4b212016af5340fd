//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the database instead, so workers carry on
//! serving other requests while a checkout or reconciliation is being written.
//!
//! User-facing routes identify the caller with [`RequestIdentity`], which reads the user id that the upstream
//! authentication layer forwards. The payment webhook is called by the bank gateway, and is guarded by the API key
//! middleware instead.
use actix_web::{get, web, HttpResponse, Responder};
use ecom_payment_engine::{
    cart_objects::{CartItemRequest, DeleteCartItemsRequest, DeleteCartItemsResult},
    inventory::ValidationMode,
    order_objects::ShopCheckout,
    payment_objects::BankTransferWebhook,
    traits::{CartManagement, OrderManagement, PaymentError, PaymentGatewayDatabase},
    CartApi,
    OrderFlowApi,
    PaymentApi,
};
use log::*;

use crate::{
    data_objects::{OrderListParams, PageParams, WebhookAck},
    errors::ServerError,
    identity::RequestIdentity,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl CartManagement);
/// The caller's cart, grouped by shop. Pages count shops. Product translations are limited to the request language.
pub async fn my_cart<B: CartManagement>(
    identity: RequestIdentity,
    query: web::Query<PageParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET cart for user #{}", identity.user_id);
    let pagination = query.pagination()?;
    let cart = api.list_grouped_by_shop(identity.user_id, pagination, &identity.language).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_to_cart => Post "/cart" impl CartManagement);
/// Adds a SKU to the caller's cart. If the SKU is already there, the quantities are added together.
pub async fn add_to_cart<B: CartManagement>(
    identity: RequestIdentity,
    body: web::Json<CartItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CartItemRequest { sku_id, quantity } = body.into_inner();
    debug!("💻️ POST cart for user #{}: {quantity} of SKU #{sku_id}", identity.user_id);
    let item = api.add_item(identity.user_id, sku_id, quantity).await?;
    Ok(HttpResponse::Created().json(item))
}

route!(validate_cart_item => Post "/cart/validate" impl CartManagement);
/// Checks whether a SKU could be added to the caller's cart, without changing the cart.
pub async fn validate_cart_item<B: CartManagement>(
    identity: RequestIdentity,
    body: web::Json<CartItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CartItemRequest { sku_id, quantity } = body.into_inner();
    trace!("💻️ Validating {quantity} of SKU #{sku_id} for user #{}", identity.user_id);
    let sku = api.validate(identity.user_id, sku_id, quantity, ValidationMode::Create).await?;
    Ok(HttpResponse::Ok().json(sku))
}

route!(update_cart_item => Put "/cart/{cart_item_id}" impl CartManagement);
/// Replaces the SKU and quantity of one of the caller's cart items.
pub async fn update_cart_item<B: CartManagement>(
    identity: RequestIdentity,
    path: web::Path<i64>,
    body: web::Json<CartItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let cart_item_id = path.into_inner();
    let CartItemRequest { sku_id, quantity } = body.into_inner();
    debug!("💻️ PUT cart item #{cart_item_id} for user #{}", identity.user_id);
    let item = api.update_item(identity.user_id, cart_item_id, sku_id, quantity).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(delete_cart_items => Post "/cart/delete" impl CartManagement);
/// Removes cart items from the caller's cart. Ids belonging to other users are ignored.
pub async fn delete_cart_items<B: CartManagement>(
    identity: RequestIdentity,
    body: web::Json<DeleteCartItemsRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ Deleting {} cart items for user #{}", body.cart_item_ids.len(), identity.user_id);
    let deleted_count = api.delete_items(identity.user_id, &body.cart_item_ids).await?;
    Ok(HttpResponse::Ok().json(DeleteCartItemsResult { deleted_count }))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl OrderManagement);
/// A page of the caller's orders, newest first. Use `?status=` to restrict the list to one order status.
pub async fn my_orders<B: OrderManagement>(
    identity: RequestIdentity,
    query: web::Query<OrderListParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for user #{}", identity.user_id);
    let pagination = query.pagination()?;
    let orders = api.list_orders(identity.user_id, query.status, pagination, &identity.language).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(checkout => Post "/orders" impl OrderManagement);
/// Checks out cart items from one or more shops.
///
/// The body lists, per shop, the cart items being bought and the receiver the shop should deliver to. One order is
/// created per shop, and a single payment covers all of them. The response carries the payment id, which the buyer
/// quotes as `DH<payment_id>` on the bank transfer.
pub async fn checkout<B: OrderManagement>(
    identity: RequestIdentity,
    body: web::Json<Vec<ShopCheckout>>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST orders for user #{} from {} shops", identity.user_id, body.len());
    let result = api.create_orders(identity.user_id, &body).await?;
    Ok(HttpResponse::Created().json(result))
}

route!(my_order => Get "/orders/{order_id}" impl OrderManagement);
pub async fn my_order<B: OrderManagement>(
    identity: RequestIdentity,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id} for user #{}", identity.user_id);
    let order = api.order_detail(identity.user_id, order_id, &identity.language).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Put "/orders/{order_id}/cancel" impl OrderManagement);
/// Cancels one of the caller's orders. Only orders that are still waiting for payment can be cancelled.
pub async fn cancel_order<B: OrderManagement>(
    identity: RequestIdentity,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ User #{} asked to cancel order #{order_id}", identity.user_id);
    let order = api.cancel_order(identity.user_id, order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(payment_webhook => Post "/payment" impl PaymentGatewayDatabase);
/// Route handler for bank transfer notifications.
///
/// The gateway retries any delivery that does not get a 2xx response. Replays of a transfer that has already been
/// recorded are acknowledged with `200 OK` and `"duplicate": true`, so that the gateway stops retrying. Transfers that
/// were recorded but could not settle a payment are answered with a 4xx status, and need a human to look at them.
pub async fn payment_webhook<B: PaymentGatewayDatabase>(
    body: web::Json<BankTransferWebhook>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let hook = body.into_inner();
    info!("💻️ Received bank transfer {} from {} for {}", hook.id, hook.gateway, hook.transfer_amount);
    match api.process_webhook(hook).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(WebhookAck::from(&outcome))),
        Err(PaymentError::DuplicateTransaction(id)) => {
            debug!("💻️ Acknowledging replay of bank transfer {id}");
            Ok(HttpResponse::Ok().json(WebhookAck::duplicate()))
        },
        Err(e) => Err(e.into()),
    }
}
