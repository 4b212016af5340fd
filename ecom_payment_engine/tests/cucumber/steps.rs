use chrono::{Duration, Utc};
use cucumber::{then, when};
use ecom_payment_engine::{
    db_types::{Money, NewPaymentTransaction, OrderStatusType},
    order_objects::ShopCheckout,
    query_objects::{LanguageFilter, Pagination},
    test_utils::fixtures::{count_cart_items, receiver, sku_stock},
    PaymentError,
    PaymentGatewayDatabase,
    ReconcileOutcome,
};

use crate::cucumber::ShopWorld;

#[when(expr = "{string} adds {int} {string} to their cart")]
async fn add_to_cart(world: &mut ShopWorld, user: String, quantity: i64, product: String) {
    let (user_id, sku_id) = (world.user(&user), world.sku(&product));
    world.system().cart.add_item(user_id, sku_id, quantity).await.expect("Error adding to cart");
}

#[when(expr = "{string} checks out their whole cart")]
async fn checkout_cart(world: &mut ShopWorld, user: String) {
    let user_id = world.user(&user);
    let system = world.system();
    let page = Pagination::new(1, 100).expect("Valid pagination");
    let groups =
        system.cart.list_grouped_by_shop(user_id, page, &LanguageFilter::All).await.expect("Error fetching cart");
    let request = groups
        .data
        .iter()
        .map(|g| ShopCheckout {
            shop_id: g.shop.id,
            receiver: receiver(),
            cart_item_ids: g.cart_items.iter().map(|i| i.id()).collect(),
        })
        .collect::<Vec<_>>();
    let result = system.orders.create_orders(user_id, &request).await;
    world.checkout = Some(result);
}

#[when(expr = "{string} cancels their first order")]
async fn cancel_first_order(world: &mut ShopWorld, user: String) {
    let user_id = world.user(&user);
    let order_id = world.last_checkout().orders[0].id;
    world.system().orders.cancel_order(user_id, order_id).await.expect("Error cancelling order");
}

#[when(expr = "the bank reports transfer {int} of {int} VND for the last payment")]
async fn transfer_for_last_payment(world: &mut ShopWorld, id: i64, amount: i64) {
    let code = format!("DH{:06}", world.last_checkout().payment_id);
    let transfer = NewPaymentTransaction::new(id, Money::from(amount)).with_code(code);
    let result = world.system().payments.reconcile(transfer).await;
    world.reconciliation = Some(result);
}

#[when(expr = "the bank reports transfer {int} of {int} VND with content {string}")]
async fn transfer_with_content(world: &mut ShopWorld, id: i64, amount: i64, content: String) {
    let transfer = NewPaymentTransaction::new(id, Money::from(amount)).with_content(content);
    let result = world.system().payments.reconcile(transfer).await;
    world.reconciliation = Some(result);
}

#[when("the payment window closes")]
async fn payment_window_closes(world: &mut ShopWorld) {
    let later = Utc::now() + Duration::days(2);
    world.system().payments.expire_pending_payments(later).await.expect("Error expiring payments");
}

#[then(expr = "the checkout creates {int} orders with a payment of {int} VND")]
async fn checkout_created(world: &mut ShopWorld, count: usize, total: i64) {
    let payment_id = world.last_checkout().payment_id;
    assert_eq!(world.last_checkout().orders.len(), count);
    let payment = world.db().fetch_payment(payment_id).await.unwrap().expect("Payment not found");
    assert_eq!(payment.total_price(), Money::from(total));
}

#[then(expr = "the checkout fails because {string} is out of stock")]
async fn checkout_out_of_stock(world: &mut ShopWorld, product: String) {
    let sku_id = world.sku(&product);
    match &world.checkout {
        Some(Err(ecom_payment_engine::OrderFlowError::OutOfStock(id))) => assert_eq!(*id, sku_id),
        other => panic!("Expected an out-of-stock error, got {other:?}"),
    }
}

#[then(expr = "{string} has {int} in stock")]
async fn in_stock(world: &mut ShopWorld, product: String, stock: i64) {
    let sku_id = world.sku(&product);
    assert_eq!(sku_stock(world.db().pool(), sku_id).await, stock);
}

#[then(expr = "the cart of {string} holds {int} items")]
async fn cart_holds(world: &mut ShopWorld, user: String, count: i64) {
    let user_id = world.user(&user);
    assert_eq!(count_cart_items(world.db().pool(), user_id).await, count);
}

#[then(expr = "the payment is {word}")]
async fn payment_status(world: &mut ShopWorld, status: String) {
    let payment_id = world.last_checkout().payment_id;
    let payment = world.db().fetch_payment(payment_id).await.unwrap().expect("Payment not found");
    assert_eq!(payment.payment.status.to_string(), status);
}

#[then(expr = "every order is {word}")]
async fn order_statuses(world: &mut ShopWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let payment_id = world.last_checkout().payment_id;
    let payment = world.db().fetch_payment(payment_id).await.unwrap().expect("Payment not found");
    for order in &payment.orders {
        assert_eq!(order.order.status, expected, "Order #{} has the wrong status", order.order.id);
    }
}

#[then("the transfer settles the payment")]
async fn transfer_settles(world: &mut ShopWorld) {
    match &world.reconciliation {
        Some(Ok(ReconcileOutcome::Paid(_))) => {},
        other => panic!("Expected the transfer to settle the payment, got {other:?}"),
    }
}

#[then(expr = "the transfer is rejected as {word}")]
async fn transfer_rejected(world: &mut ShopWorld, reason: String) {
    let err = match &world.reconciliation {
        Some(Err(e)) => e.clone(),
        other => panic!("Expected the transfer to be rejected, got {other:?}"),
    };
    let matched = match reason.as_str() {
        "duplicate" => matches!(err, PaymentError::DuplicateTransaction(_)),
        "mismatched" => matches!(err, PaymentError::AmountMismatch { .. }),
        "malformed" => matches!(err, PaymentError::MalformedReference(_)),
        "unknown" => matches!(err, PaymentError::PaymentNotFound(_)),
        "closed" => matches!(err, PaymentError::PaymentClosed(_)),
        _ => panic!("Unknown rejection reason '{reason}'"),
    };
    assert!(matched, "Expected a {reason} rejection, got {err}");
}

#[then(expr = "transfer {int} is on record")]
async fn transfer_recorded(world: &mut ShopWorld, id: i64) {
    let record = world.db().fetch_payment_transaction(id).await.unwrap();
    assert!(record.is_some(), "Transfer {id} was not recorded");
}
