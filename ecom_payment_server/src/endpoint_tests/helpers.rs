use actix_web::{
    body::MessageBody,
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use ecom_common::Money;
use ecom_payment_engine::db_types::{CartItem, Order, OrderStatusType, Receiver, Sku};
use log::debug;
use serde_json::Value;

use crate::{
    config::ServerOptions,
    server::{json_config, path_config, query_config},
};

pub const BUYER: i64 = 5;

/// Sends `req` to an app set up by `configure`, with the same extractor configuration as the real server, and returns
/// the status and body.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::Data::new(ServerOptions::default()))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        // Middleware rejections arrive as errors rather than responses
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn as_buyer(req: TestRequest) -> TestRequest {
    req.insert_header(("x-user-id", BUYER.to_string()))
}

pub fn json_body(req: TestRequest, body: &Value) -> TestRequest {
    req.insert_header(ContentType::json()).set_payload(body.to_string())
}

pub fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("Response was not JSON")
}

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

pub fn cart_item(id: i64, sku_id: i64, quantity: i64) -> CartItem {
    CartItem { id, user_id: BUYER, sku_id, quantity, created_at: timestamp(), updated_at: timestamp() }
}

pub fn sku(id: i64, stock: i64) -> Sku {
    Sku {
        id,
        product_id: 1,
        created_by_id: 7,
        value: "500g".into(),
        price: Money::from(100),
        stock,
        image: "tea.png".into(),
        deleted_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn order(id: i64, payment_id: i64, status: OrderStatusType) -> Order {
    Order {
        id,
        user_id: BUYER,
        status,
        receiver: Receiver { name: "Lan".into(), phone: "0901234567".into(), address: "12 Hang Bac, Ha Noi".into() },
        shop_id: 7,
        payment_id,
        created_by_id: BUYER,
        updated_by_id: None,
        deleted_by_id: None,
        deleted_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
