//! 通过 Agent 组件以 JSON 工具调用驱动一次完整点单

use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;
use voice_order::agent::{
    create_agent_components, process_tool_call, AgentComponents, AgentKind, CallOutcome,
    SharedResources,
};
use voice_order::catalog::Catalog;
use voice_order::config::AppConfig;
use voice_order::sdr::SdrContent;

fn shared() -> SharedResources {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/catalog.json");
    SharedResources {
        catalog: Arc::new(Catalog::load(path).unwrap()),
        sdr_content: Arc::new(SdrContent::default()),
        fraud_store: None,
    }
}

/// 执行一次调用并取出要念给用户的话
async fn say(components: &AgentComponents, raw: &str) -> String {
    match process_tool_call(components, raw).await.unwrap() {
        CallOutcome::Speak(reply) => reply.speech,
        CallOutcome::Retry(prompt) => panic!("unexpected retry: {prompt}"),
    }
}

#[tokio::test]
async fn test_voice_order_via_tool_calls() {
    let dir = TempDir::new().unwrap();
    let mut cfg = AppConfig::default();
    cfg.orders.orders_dir = dir.path().join("orders");
    cfg.orders.id_prefix = "BK".to_string();

    let components = create_agent_components(&cfg, AgentKind::Ordering, &shared()).unwrap();

    let reply = say(&components, r#"{"tool": "add_to_cart", "args": {"item_name": "Whopper", "quantity": 2, "notes": "no onions"}}"#).await;
    assert_eq!(reply, "Added 2x Whopper to cart. Total: ₹398.00");

    let reply = say(&components, r#"{"tool": "recommend_meal_upgrade", "args": {"base_item": "Whopper"}}"#).await;
    assert!(reply.contains("Fries (Medium)"));

    say(&components, r#"{"tool": "add_to_cart", "args": {"item_name": "onion rings"}}"#).await;
    let reply = say(&components, r#"{"tool": "view_cart", "args": {}}"#).await;
    assert!(reply.contains("- 2x Whopper (no onions): ₹398.00"));
    assert!(reply.ends_with("Total: ₹507.00"));

    let reply = say(&components, r#"{"tool": "place_order", "args": {}}"#).await;
    assert!(reply.contains("Order ID is BK-"));

    let order_id = reply
        .split("Order ID is ")
        .nth(1)
        .and_then(|rest| rest.split('.').next())
        .unwrap();
    let session = components.session.as_ref().unwrap();
    let order = session.orders().get_order(order_id).unwrap().unwrap();
    assert_eq!(order.total, Decimal::from(507));
    assert_eq!(order.items.len(), 2);
    assert!(session.cart().await.is_empty());

    let reply = say(&components, r#"{"tool": "place_order", "args": {}}"#).await;
    assert_eq!(reply, "Your cart is empty. I can't place an empty order.");
}
