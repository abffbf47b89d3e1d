//! 点单会话
//!
//! 每个通话 / 会话独占一个购物车；菜单只读共享，订单目录由 OrderManager 管理。
//! 工具是 Send + Sync 的 trait 对象，所以购物车放在异步 Mutex 里，但同一会话内的调用是顺序的。

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};

use crate::catalog::Catalog;
use crate::order::{Cart, OrderError, OrderManager};

pub struct OrderSession {
    cart: Mutex<Cart>,
    orders: OrderManager,
    catalog: Arc<Catalog>,
    currency: String,
}

/// 结账结果：订单号与下单时的总价
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub order_id: String,
    pub total: Decimal,
}

impl OrderSession {
    pub fn new(orders: OrderManager, catalog: Arc<Catalog>, currency: impl Into<String>) -> Self {
        Self {
            cart: Mutex::new(Cart::new()),
            orders,
            catalog,
            currency: currency.into(),
        }
    }

    pub async fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// 金额口播格式，如 ₹398.00
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency, amount)
    }

    /// 下单并清空购物车；失败时购物车保持原样
    pub async fn checkout(
        &self,
        customer_info: Option<Map<String, Value>>,
    ) -> Result<Checkout, OrderError> {
        let mut cart = self.cart.lock().await;
        let total = cart.get_total();
        let order_id = self.orders.place_order(&cart, customer_info)?;
        cart.clear();
        Ok(Checkout { order_id, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_checkout_clears_cart() {
        let dir = TempDir::new().unwrap();
        let session = OrderSession::new(
            OrderManager::new(dir.path()),
            Arc::new(Catalog::default()),
            "₹",
        );
        session
            .cart()
            .await
            .add_item("w1", "Whopper", Decimal::from(199), 2, "").unwrap();

        let checkout = session.checkout(None).await.unwrap();
        assert_eq!(checkout.total, Decimal::from(398));
        assert!(session.cart().await.is_empty());
        assert_eq!(session.cart().await.get_total(), Decimal::ZERO);

        let order = session.orders().get_order(&checkout.order_id).unwrap().unwrap();
        assert_eq!(order.total, checkout.total);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let dir = TempDir::new().unwrap();
        let session = OrderSession::new(
            OrderManager::new(dir.path().join("orders")),
            Arc::new(Catalog::default()),
            "$",
        );
        assert!(matches!(session.checkout(None).await, Err(OrderError::EmptyCart)));
        assert_eq!(session.format_amount(Decimal::new(1999, 2)), "$19.99");
    }
}
