//! 订单层错误
//!
//! 「未找到」一律用 Option 表达，不进入错误类型。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    /// 空购物车下单：在任何落盘动作之前拒绝
    #[error("Cart is empty")]
    EmptyCart,

    /// 单行数量超出上限；购物车保持调用前的状态
    #[error("Quantity for {id} would be {requested}, the limit per line is {max}")]
    QuantityLimit { id: String, requested: u64, max: u32 },

    #[error("Invalid order id prefix {0:?}: use ASCII letters, digits, '-' or '_'")]
    InvalidIdPrefix(String),

    #[error("Order storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Order record JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
