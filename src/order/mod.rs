//! 订单层：购物车（进行中）→ 订单（已落盘快照）

pub mod cart;
pub mod error;
pub mod id;
pub mod manager;

pub use cart::{Cart, CartSummary, LineItem, MAX_LINE_QUANTITY};
pub use error::OrderError;
pub use id::OrderIdGenerator;
pub use manager::{Order, OrderManager, OrderStatus};
