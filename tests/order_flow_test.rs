//! 点单全流程集成测试：购物车 → 下单落盘 → 按订单号读回

use rust_decimal::Decimal;
use tempfile::TempDir;
use voice_order::{Cart, OrderError, OrderManager};

#[test]
fn test_cart_flow() {
    let mut cart = Cart::new();
    cart.add_item("m1", "Milk", Decimal::new(500, 2), 1, "").unwrap();
    cart.add_item("b1", "Bread", Decimal::new(300, 2), 2, "").unwrap();
    assert_eq!(cart.get_total(), Decimal::from(11));

    cart.update_quantity("b1", 1).unwrap();
    assert_eq!(cart.get_total(), Decimal::from(8));

    cart.remove_item("m1");
    assert_eq!(cart.get_total(), Decimal::from(3));
}

#[test]
fn test_order_flow() {
    let dir = TempDir::new().unwrap();
    let manager = OrderManager::new(dir.path().join("test_orders"));

    let mut cart = Cart::new();
    cart.add_item("p1", "Pizza", Decimal::new(1500, 2), 1, "").unwrap();

    let order_id = manager.place_order(&cart, None).unwrap();
    let saved = manager.get_order(&order_id).unwrap().unwrap();
    assert_eq!(saved.total, Decimal::from(15));
    assert_eq!(saved.items[0].name, "Pizza");

    cart.clear();
    assert_eq!(cart.get_total(), Decimal::ZERO);
    assert!(cart.items().is_empty());
}

#[test]
fn test_record_total_matches_cart_at_checkout() {
    let dir = TempDir::new().unwrap();
    let manager = OrderManager::new(dir.path());

    let mut cart = Cart::new();
    cart.add_item("w1", "Whopper", Decimal::from(199), 1, "no onions").unwrap();
    cart.add_item("w1", "Whopper", Decimal::from(199), 1, "extra cheese").unwrap();
    cart.add_item("f1", "Fries (Medium)", Decimal::from(99), 3, "").unwrap();
    let total = cart.get_total();
    let snapshot = cart.to_summary();

    let order_id = manager.place_order(&cart, None).unwrap();
    // 下单后继续改购物车不影响已落盘的订单
    cart.add_item("p1", "Pepsi (Medium)", Decimal::from(79), 1, "").unwrap();

    let saved = manager.get_order(&order_id).unwrap().unwrap();
    assert_eq!(saved.total, total);
    assert_eq!(saved.items, snapshot.items);
    assert_eq!(saved.items[0].notes, "no onions, extra cheese");
    assert_eq!(saved.items[0].quantity, 2);
}

#[test]
fn test_empty_cart_rejected_without_write() {
    let dir = TempDir::new().unwrap();
    let orders_dir = dir.path().join("orders");
    let manager = OrderManager::new(&orders_dir);

    assert!(matches!(
        manager.place_order(&Cart::new(), None),
        Err(OrderError::EmptyCart)
    ));
    assert!(!orders_dir.exists());
    assert!(manager.get_order("ORD-1-0001").unwrap().is_none());
}
