use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use ecom_payment_engine::{inventory::ValidationMode, query_objects::LanguageFilter, CartApi, CartError};
use mockall::predicate::eq;
use serde_json::json;

use super::{
    helpers::{as_buyer, cart_item, json_body, parse, send_request, sku, BUYER},
    mocks::MockCartManager,
};
use crate::routes::{
    AddToCartRoute,
    DeleteCartItemsRoute,
    MyCartRoute,
    UpdateCartItemRoute,
    ValidateCartItemRoute,
};

fn configure(cart: MockCartManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(CartApi::new(cart)))
            .service(MyCartRoute::<MockCartManager>::new())
            .service(AddToCartRoute::<MockCartManager>::new())
            .service(ValidateCartItemRoute::<MockCartManager>::new())
            .service(UpdateCartItemRoute::<MockCartManager>::new())
            .service(DeleteCartItemsRoute::<MockCartManager>::new());
    }
}

#[actix_web::test]
async fn add_to_cart() {
    let _ = env_logger::try_init().ok();
    let mut cart = MockCartManager::new();
    cart.expect_add_cart_item()
        .with(eq(BUYER), eq(1), eq(2))
        .times(1)
        .returning(|_, sku_id, quantity| Ok(cart_item(10, sku_id, quantity)));
    let req = json_body(as_buyer(TestRequest::post().uri("/cart")), &json!({"sku_id": 1, "quantity": 2}));
    let (status, body) = send_request(req, configure(cart)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body = parse(&body);
    assert_eq!(body["id"], 10);
    assert_eq!(body["quantity"], 2);
}

#[actix_web::test]
async fn cart_requires_a_user() {
    let _ = env_logger::try_init().ok();
    let req = json_body(TestRequest::post().uri("/cart"), &json!({"sku_id": 1, "quantity": 2}));
    let (status, body) = send_request(req, configure(MockCartManager::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse(&body)["kind"], "Unauthenticated");
}

#[actix_web::test]
async fn out_of_stock_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut cart = MockCartManager::new();
    cart.expect_add_cart_item().returning(|_, sku_id, _| Err(CartError::OutOfStock(sku_id)));
    let req = json_body(as_buyer(TestRequest::post().uri("/cart")), &json!({"sku_id": 3, "quantity": 9}));
    let (status, body) = send_request(req, configure(cart)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = parse(&body);
    assert_eq!(body["kind"], "OutOfStock");
    assert_eq!(body["error"], "SKU 3 does not have enough stock");
}

#[actix_web::test]
async fn malformed_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = json_body(as_buyer(TestRequest::post().uri("/cart")), &json!({"sku": "one"}));
    let (status, body) = send_request(req, configure(MockCartManager::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["kind"], "BadRequest");
}

#[actix_web::test]
async fn validate_does_not_add() {
    let _ = env_logger::try_init().ok();
    let mut cart = MockCartManager::new();
    cart.expect_validate_sku()
        .with(eq(BUYER), eq(4), eq(1), eq(ValidationMode::Create))
        .times(1)
        .returning(|_, sku_id, _, _| Ok(sku(sku_id, 6)));
    cart.expect_add_cart_item().never();
    let req = json_body(as_buyer(TestRequest::post().uri("/cart/validate")), &json!({"sku_id": 4, "quantity": 1}));
    let (status, body) = send_request(req, configure(cart)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["stock"], 6);
}

#[actix_web::test]
async fn update_someone_elses_item() {
    let _ = env_logger::try_init().ok();
    let mut cart = MockCartManager::new();
    cart.expect_update_cart_item()
        .with(eq(BUYER), eq(77), eq(1), eq(3))
        .returning(|_, id, _, _| Err(CartError::NotFound(id)));
    let req = json_body(as_buyer(TestRequest::put().uri("/cart/77")), &json!({"sku_id": 1, "quantity": 3}));
    let (status, body) = send_request(req, configure(cart)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse(&body)["kind"], "NotFound");
}

#[actix_web::test]
async fn non_numeric_cart_item_id() {
    let _ = env_logger::try_init().ok();
    let req = json_body(as_buyer(TestRequest::put().uri("/cart/abc")), &json!({"sku_id": 1, "quantity": 3}));
    let (status, _) = send_request(req, configure(MockCartManager::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn delete_items() {
    let _ = env_logger::try_init().ok();
    let mut cart = MockCartManager::new();
    cart.expect_delete_cart_items()
        .withf(|user_id, ids| *user_id == BUYER && ids == [1, 2, 3])
        .times(1)
        .returning(|_, _| Ok(2));
    let req = json_body(as_buyer(TestRequest::post().uri("/cart/delete")), &json!({"cart_item_ids": [1, 2, 3]}));
    let (status, body) = send_request(req, configure(cart)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"deleted_count": 2}));
}

#[actix_web::test]
async fn empty_cart_in_the_request_language() {
    let _ = env_logger::try_init().ok();
    let mut cart = MockCartManager::new();
    cart.expect_fetch_purchasable_cart_items()
        .withf(|user_id, language| *user_id == BUYER && *language == LanguageFilter::Only("vi".into()))
        .times(1)
        .returning(|_, _| Ok(vec![]));
    let req = as_buyer(TestRequest::get().uri("/cart?page=1&limit=5")).insert_header(("accept-language", "vi"));
    let (status, body) = send_request(req, configure(cart)).await;
    assert_eq!(status, StatusCode::OK);
    let body = parse(&body);
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn page_zero_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = as_buyer(TestRequest::get().uri("/cart?page=0"));
    let (status, body) = send_request(req, configure(MockCartManager::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["kind"], "BadRequest");
}
