use cucumber::given;
use ecom_payment_engine::test_utils::fixtures::{add_translation, create_live_product, create_sku, create_user};

use crate::cucumber::{shop_world::ShopSystem, ShopWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ShopWorld) {
    let system = ShopSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a buyer named {string}")]
async fn buyer(world: &mut ShopWorld, name: String) {
    let id = create_user(world.db().pool(), &name).await;
    world.users.insert(name, id);
}

//        Given shop "Tea House" sells "Green tea" at 100 VND with 5 in stock
#[given(expr = "shop {string} sells {string} at {int} VND with {int} in stock")]
async fn shop_sells(world: &mut ShopWorld, shop: String, product: String, price: i64, stock: i64) {
    let pool = world.db().pool().clone();
    let shop_id = match world.users.get(&shop) {
        Some(id) => *id,
        None => {
            let id = create_user(&pool, &shop).await;
            world.users.insert(shop, id);
            id
        },
    };
    let product_id = create_live_product(&pool, shop_id, &product).await;
    add_translation(&pool, product_id, "en", &product).await;
    let sku = create_sku(&pool, product_id, shop_id, price, stock).await;
    world.skus.insert(product, sku);
}
