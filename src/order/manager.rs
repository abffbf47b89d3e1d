//! 订单落盘
//!
//! 每个订单一个 JSON 文件：`<orders_dir>/<order_id>.json`。
//! OrderManager 不持有购物车，只记住目录；单写者，无锁。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::cart::{Cart, LineItem};
use super::error::OrderError;
use super::id::{is_valid_id_token, OrderIdGenerator};

/// 订单状态；目前只有 placed，取消 / 退款 / 履约不在本层
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
}

/// 已下单快照，创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer_info: Map<String, Value>,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct OrderManager {
    orders_dir: PathBuf,
    ids: OrderIdGenerator,
}

impl OrderManager {
    pub fn new(orders_dir: impl AsRef<Path>) -> Self {
        Self {
            orders_dir: orders_dir.as_ref().to_path_buf(),
            ids: OrderIdGenerator::default(),
        }
    }

    /// 更换订单号前缀；前缀会成为文件名的一部分，必须通过 is_valid_id_token
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Result<Self, OrderError> {
        self.ids = OrderIdGenerator::new(prefix)?;
        Ok(self)
    }

    pub fn orders_dir(&self) -> &Path {
        &self.orders_dir
    }

    fn order_path(&self, order_id: &str) -> PathBuf {
        self.orders_dir.join(format!("{order_id}.json"))
    }

    /// 下单：空车直接返回 EmptyCart（不建目录、不写文件）；成功则写一份记录并返回订单号
    pub fn place_order(
        &self,
        cart: &Cart,
        customer_info: Option<Map<String, Value>>,
    ) -> Result<String, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let summary = cart.to_summary();
        let order = Order {
            order_id: self.ids.next_id(),
            created_at: Utc::now(),
            customer_info: customer_info.unwrap_or_default(),
            items: summary.items,
            total: summary.total,
            status: OrderStatus::Placed,
        };

        std::fs::create_dir_all(&self.orders_dir)?;
        let path = self.order_path(&order.order_id);
        std::fs::write(&path, serde_json::to_string_pretty(&order)?)?;
        tracing::info!(
            order_id = %order.order_id,
            items = order.items.len(),
            total = %order.total,
            path = %path.display(),
            "order placed"
        );
        Ok(order.order_id)
    }

    /// 按订单号读取；文件不存在（或订单号含路径分隔符）时返回 Ok(None)
    pub fn get_order(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        if !is_valid_id_token(order_id) {
            return Ok(None);
        }
        let path = self.order_path(order_id);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_place_then_get() {
        let dir = TempDir::new().unwrap();
        let manager = OrderManager::new(dir.path().join("orders"));

        let mut cart = Cart::new();
        cart.add_item("p1", "Pizza", Decimal::from(15), 1, "").unwrap();
        let expected_total = cart.get_total();

        let order_id = manager.place_order(&cart, None).unwrap();
        assert!(order_id.starts_with("ORD-"));

        let order = manager.get_order(&order_id).unwrap().unwrap();
        assert_eq!(order.total, expected_total);
        assert_eq!(order.total, Decimal::new(1500, 2));
        assert_eq!(order.items[0].name, "Pizza");
        assert_eq!(order.items, cart.items());
        assert_eq!(order.status, OrderStatus::Placed);
        assert!(order.customer_info.is_empty());
    }

    #[test]
    fn test_empty_cart_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let orders_dir = dir.path().join("orders");
        let manager = OrderManager::new(&orders_dir);

        let err = manager.place_order(&Cart::new(), None).unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
        assert!(!orders_dir.exists());
    }

    #[test]
    fn test_missing_order_is_none() {
        let dir = TempDir::new().unwrap();
        let manager = OrderManager::new(dir.path());
        assert!(manager.get_order("ORD-0-0000").unwrap().is_none());
        assert!(manager.get_order("../secrets").unwrap().is_none());
        assert!(manager.get_order("").unwrap().is_none());
    }

    #[test]
    fn test_record_layout() {
        let dir = TempDir::new().unwrap();
        let manager = OrderManager::new(dir.path()).with_id_prefix("BK").unwrap();

        let mut cart = Cart::new();
        cart.add_item("w1", "Whopper", Decimal::from(199), 2, "no onions").unwrap();
        let mut info = Map::new();
        info.insert("name".to_string(), Value::from("Asha"));

        let order_id = manager.place_order(&cart, Some(info)).unwrap();
        let raw = std::fs::read_to_string(dir.path().join(format!("{order_id}.json"))).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(json["order_id"], Value::from(order_id.as_str()));
        assert!(json["timestamp"].is_string());
        assert_eq!(json["customer_info"]["name"], "Asha");
        assert_eq!(json["items"][0]["id"], "w1");
        assert_eq!(json["items"][0]["price"], serde_json::json!(199.0));
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["items"][0]["notes"], "no onions");
        assert_eq!(json["total"], serde_json::json!(398.0));
        assert_eq!(json["status"], "placed");
    }

    #[test]
    fn test_custom_prefix_round_trips() {
        let dir = TempDir::new().unwrap();
        let orders_dir = dir.path().join("orders");
        let manager = OrderManager::new(&orders_dir).with_id_prefix("BK_Delhi-2").unwrap();
        let mut cart = Cart::new();
        cart.add_item("w1", "Whopper", Decimal::from(199), 1, "").unwrap();

        let order_id = manager.place_order(&cart, None).unwrap();
        assert!(order_id.starts_with("BK_Delhi-2-"));
        assert!(manager.get_order(&order_id).unwrap().is_some());
    }

    #[test]
    fn test_unsafe_prefix_is_rejected() {
        let dir = TempDir::new().unwrap();
        for prefix in ["BK#1", "../escape", "nested/BK"] {
            let err = OrderManager::new(dir.path().join("orders"))
                .with_id_prefix(prefix)
                .unwrap_err();
            assert!(matches!(err, OrderError::InvalidIdPrefix(_)));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_back_to_back_orders_do_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let manager = OrderManager::new(dir.path());
        let mut cart = Cart::new();
        cart.add_item("a", "Apple", Decimal::ONE, 1, "").unwrap();

        let first = manager.place_order(&cart, None).unwrap();
        let second = manager.place_order(&cart, None).unwrap();
        assert_ne!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
