//! 订单号生成
//!
//! 格式 `{prefix}-{unix 秒}-{序号}`。秒级时间戳本身在同一秒内会重复，
//! 序号取自进程级原子计数器，保证同进程内连续下单也不会撞号。

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::error::OrderError;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct OrderIdGenerator {
    prefix: String,
}

/// 订单号直接用作文件名，只允许 ASCII 字母数字、'-'、'_'
pub fn is_valid_id_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl OrderIdGenerator {
    /// 前缀不合法时返回 InvalidIdPrefix，否则生成的订单号会被 get_order 拒绝
    pub fn new(prefix: impl Into<String>) -> Result<Self, OrderError> {
        let prefix = prefix.into();
        if !is_valid_id_token(&prefix) {
            return Err(OrderError::InvalidIdPrefix(prefix));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_id(&self) -> String {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{:04}", self.prefix, Utc::now().timestamp(), seq)
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self {
            prefix: "ORD".to_string(),
        }
    }
}
