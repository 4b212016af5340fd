use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use ecom_common::{Money, Secret};
use ecom_payment_engine::{
    events::EventProducers,
    traits::{PaymentSettlement, ReconcileOutcome},
    PaymentApi,
    PaymentError,
};
use mockall::predicate::eq;
use serde_json::{json, Value};

use super::{
    helpers::{json_body, parse, send_request, BUYER},
    mocks::MockPaymentGateway,
};
use crate::{middleware::ApiKeyMiddlewareFactory, routes::PaymentWebhookRoute};

const API_KEY: &str = "bank-gateway-key";

fn configure(gateway: MockPaymentGateway, checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(PaymentApi::new(gateway, EventProducers::default()))).service(
            web::scope("/webhooks")
                .wrap(ApiKeyMiddlewareFactory::new(Secret::new(API_KEY.to_string()), checks))
                .service(PaymentWebhookRoute::<MockPaymentGateway>::new()),
        );
    }
}

fn transfer(code: Option<&str>, amount: i64) -> Value {
    json!({
        "id": 92704,
        "gateway": "Vietcombank",
        "transactionDate": "2024-05-01 10:02:37",
        "accountNumber": "0123499999",
        "code": code,
        "content": "chuyen tien mua hang",
        "transferType": "in",
        "transferAmount": amount,
        "accumulated": 19077000,
        "subAccount": null,
        "referenceCode": "MBVCB.3278907687",
        "description": ""
    })
}

fn webhook_request(key: Option<&str>, body: &Value) -> TestRequest {
    let mut req = TestRequest::post().uri("/webhooks/payment");
    if let Some(key) = key {
        req = req.insert_header(("Authorization", format!("Apikey {key}")));
    }
    json_body(req, body)
}

fn paid(payment_id: i64) -> ReconcileOutcome {
    ReconcileOutcome::Paid(PaymentSettlement { payment_id, user_id: BUYER, orders: vec![] })
}

#[actix_web::test]
async fn settles_a_payment() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_reconcile_transfer()
        .withf(|t| t.id == 92704 && t.code.as_deref() == Some("DH000123") && t.transfer_amount == Money::from(250))
        .times(1)
        .returning(|_| Ok(paid(123)));
    gateway.expect_remove_payment_timeout().with(eq(123)).times(1).returning(|_| Ok(true));
    let req = webhook_request(Some(API_KEY), &transfer(Some("DH000123"), 250));
    let (status, body) = send_request(req, configure(gateway, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"success": true, "payment_id": 123}));
}

#[actix_web::test]
async fn replays_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_reconcile_transfer().returning(|t| Err(PaymentError::DuplicateTransaction(t.id)));
    gateway.expect_remove_payment_timeout().never();
    let req = webhook_request(Some(API_KEY), &transfer(Some("DH000123"), 250));
    let (status, body) = send_request(req, configure(gateway, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"success": true, "duplicate": true}));
}

#[actix_web::test]
async fn already_settled_payments_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_reconcile_transfer().returning(|_| Ok(ReconcileOutcome::AlreadySettled { payment_id: 123 }));
    gateway.expect_remove_payment_timeout().never();
    let req = webhook_request(Some(API_KEY), &transfer(Some("DH123"), 250));
    let (status, body) = send_request(req, configure(gateway, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["already_settled"], true);
}

#[actix_web::test]
async fn rejected_transfers() {
    let _ = env_logger::try_init().ok();
    let cases = [
        (PaymentError::MalformedReference("no DH code".into()), StatusCode::BAD_REQUEST, "MalformedReference"),
        (PaymentError::PaymentNotFound(999), StatusCode::NOT_FOUND, "PaymentNotFound"),
        (
            PaymentError::AmountMismatch { payment_id: 123, expected: Money::from(250), received: Money::from(249) },
            StatusCode::UNPROCESSABLE_ENTITY,
            "AmountMismatch",
        ),
        (PaymentError::PaymentClosed(123), StatusCode::CONFLICT, "PaymentClosed"),
        (PaymentError::DatabaseError("disk I/O error".into()), StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
    ];
    for (err, expected_status, kind) in cases {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_reconcile_transfer().returning(move |_| Err(err.clone()));
        let req = webhook_request(Some(API_KEY), &transfer(Some("DH123"), 249));
        let (status, body) = send_request(req, configure(gateway, true)).await;
        assert_eq!(status, expected_status);
        assert_eq!(parse(&body)["kind"], kind);
    }
}

#[actix_web::test]
async fn bad_transaction_date() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_reconcile_transfer().never();
    let mut body = transfer(Some("DH123"), 250);
    body["transactionDate"] = json!("yesterday");
    let req = webhook_request(Some(API_KEY), &body);
    let (status, body) = send_request(req, configure(gateway, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["kind"], "InvalidTransactionDate");
}

#[actix_web::test]
async fn missing_or_wrong_api_key() {
    let _ = env_logger::try_init().ok();
    for key in [None, Some("not-the-key"), Some("")] {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_reconcile_transfer().never();
        let req = webhook_request(key, &transfer(Some("DH123"), 250));
        let (status, body) = send_request(req, configure(gateway, true)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(parse(&body)["kind"], "Unauthenticated");
    }
}

#[actix_web::test]
async fn wrong_auth_scheme() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_reconcile_transfer().never();
    let req = TestRequest::post()
        .uri("/webhooks/payment")
        .insert_header(("Authorization", format!("Bearer {API_KEY}")));
    let req = json_body(req, &transfer(Some("DH123"), 250));
    let (status, _) = send_request(req, configure(gateway, true)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn key_checks_can_be_disabled() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_reconcile_transfer().times(1).returning(|_| Ok(paid(123)));
    gateway.expect_remove_payment_timeout().returning(|_| Ok(false));
    let req = webhook_request(None, &transfer(Some("DH123"), 250));
    let (status, _) = send_request(req, configure(gateway, false)).await;
    assert_eq!(status, StatusCode::OK);
}
