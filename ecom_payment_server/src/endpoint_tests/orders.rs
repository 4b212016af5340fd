use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Duration;
use ecom_payment_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    order_objects::CheckoutResult,
    traits::OrderWithItems,
    OrderFlowApi,
    OrderFlowError,
};
use mockall::predicate::eq;
use serde_json::json;

use super::{
    helpers::{as_buyer, json_body, order, parse, send_request, BUYER},
    mocks::MockOrderManager,
};
use crate::routes::{CancelOrderRoute, CheckoutRoute, MyOrderRoute, MyOrdersRoute};

fn configure(orders: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(orders, EventProducers::default()).with_unpaid_order_timeout(Duration::hours(2));
        cfg.app_data(web::Data::new(api))
            .service(MyOrdersRoute::<MockOrderManager>::new())
            .service(CheckoutRoute::<MockOrderManager>::new())
            .service(MyOrderRoute::<MockOrderManager>::new())
            .service(CancelOrderRoute::<MockOrderManager>::new());
    }
}

fn checkout_body() -> serde_json::Value {
    json!([{
        "shop_id": 7,
        "receiver": {"name": "Lan", "phone": "0901234567", "address": "12 Hang Bac, Ha Noi"},
        "cart_item_ids": [1, 2]
    }])
}

#[actix_web::test]
async fn checkout_returns_the_payment_code() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders
        .expect_create_orders()
        .withf(|user_id, checkout, timeout| {
            *user_id == BUYER &&
                checkout.len() == 1 &&
                checkout[0].cart_item_ids == [1, 2] &&
                *timeout == Duration::hours(2)
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(CheckoutResult { payment_id: 123, orders: vec![order(1, 123, OrderStatusType::PendingPayment)] })
        });
    let req = json_body(as_buyer(TestRequest::post().uri("/orders")), &checkout_body());
    let (status, body) = send_request(req, configure(orders)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body = parse(&body);
    assert_eq!(body["payment_id"], 123);
    assert_eq!(body["orders"][0]["status"], "PENDING_PAYMENT");
    assert_eq!(body["orders"][0]["receiver"]["name"], "Lan");
}

#[actix_web::test]
async fn checkout_errors() {
    let _ = env_logger::try_init().ok();
    let cases = [
        (OrderFlowError::SkuNotBelongToShop { sku_id: 1, shop_id: 8 }, StatusCode::BAD_REQUEST, "SkuNotBelongToShop"),
        (OrderFlowError::CartItemNotFound, StatusCode::NOT_FOUND, "CartItemNotFound"),
        (OrderFlowError::OutOfStock(2), StatusCode::BAD_REQUEST, "OutOfStock"),
        (OrderFlowError::DatabaseError("locked".into()), StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
    ];
    for (err, expected_status, kind) in cases {
        let mut orders = MockOrderManager::new();
        orders.expect_create_orders().returning(move |_, _, _| Err(err.clone()));
        let req = json_body(as_buyer(TestRequest::post().uri("/orders")), &checkout_body());
        let (status, body) = send_request(req, configure(orders)).await;
        assert_eq!(status, expected_status);
        assert_eq!(parse(&body)["kind"], kind);
    }
}

#[actix_web::test]
async fn list_orders_with_status_filter() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders
        .expect_search_orders()
        .withf(|filter, pagination| {
            filter.user_id == Some(BUYER) &&
                filter.status == Some(OrderStatusType::Cancelled) &&
                pagination.page() == 2 &&
                pagination.limit() == 1
        })
        .times(1)
        .returning(|_, _| {
            let cancelled = OrderWithItems { order: order(2, 9, OrderStatusType::Cancelled), items: vec![] };
            Ok((vec![cancelled], 2))
        });
    let req = as_buyer(TestRequest::get().uri("/orders?page=2&limit=1&status=CANCELLED"));
    let (status, body) = send_request(req, configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    let body = parse(&body);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["data"][0]["id"], 2);
    assert_eq!(body["data"][0]["status"], "CANCELLED");
}

#[actix_web::test]
async fn unknown_status_filter() {
    let _ = env_logger::try_init().ok();
    let req = as_buyer(TestRequest::get().uri("/orders?status=LOST"));
    let (status, _) = send_request(req, configure(MockOrderManager::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn order_detail_for_another_user() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_for_user().with(eq(BUYER), eq(44)).times(1).returning(|_, _| Ok(None));
    let req = as_buyer(TestRequest::get().uri("/orders/44"));
    let (status, body) = send_request(req, configure(orders)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = parse(&body);
    assert_eq!(body["kind"], "OrderNotFound");
    assert_eq!(body["error"], "Order 44 does not exist");
}

#[actix_web::test]
async fn cancel_order() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders
        .expect_cancel_order()
        .with(eq(BUYER), eq(1))
        .times(1)
        .returning(|_, id| Ok(order(id, 123, OrderStatusType::Cancelled)));
    let req = as_buyer(TestRequest::put().uri("/orders/1/cancel"));
    let (status, body) = send_request(req, configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["status"], "CANCELLED");
}

#[actix_web::test]
async fn cancel_a_paid_order() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_cancel_order().returning(|_, order_id| {
        Err(OrderFlowError::CannotCancelOrder { order_id, status: OrderStatusType::PendingPickup })
    });
    let req = as_buyer(TestRequest::put().uri("/orders/1/cancel"));
    let (status, body) = send_request(req, configure(orders)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse(&body)["kind"], "CannotCancelOrder");
}
