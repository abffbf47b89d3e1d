//! 购物车：进行中的订单
//!
//! 以商品 id 为键保存 LineItem；同 id 再次加入时合并数量与备注。
//! 总价每次按需重算，不做缓存。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::OrderError;

/// 单行数量上限；超出时拒绝，不截断
pub const MAX_LINE_QUANTITY: u32 = 999;

fn check_quantity(id: &str, requested: u64) -> Result<u32, OrderError> {
    u32::try_from(requested)
        .ok()
        .filter(|q| *q <= MAX_LINE_QUANTITY)
        .ok_or_else(|| OrderError::QuantityLimit {
            id: id.to_string(),
            requested,
            max: MAX_LINE_QUANTITY,
        })
}

/// 购物车中的一行：单价 × 数量，外加自由文本备注（如 "no onions"）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    /// 持久化字段名为 price，按 JSON number 写出
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// 序列化快照：供落盘或展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// 购物车：所有条目 quantity 恒大于 0，按首次加入顺序展示
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// 加入商品；id 已存在时累加数量，并以 ", " 追加非空备注。返回合并后的条目。
    /// quantity 为 0 时按默认值 1 处理，保证车内不出现 0 数量的行；
    /// 合并后超过 MAX_LINE_QUANTITY 返回 QuantityLimit，车内不变
    pub fn add_item(
        &mut self,
        id: &str,
        name: &str,
        unit_price: Decimal,
        quantity: u32,
        notes: &str,
    ) -> Result<LineItem, OrderError> {
        let notes = notes.trim();
        let quantity = quantity.max(1);
        match self.position(id) {
            Some(idx) => {
                let item = &mut self.items[idx];
                item.quantity =
                    check_quantity(id, u64::from(item.quantity) + u64::from(quantity))?;
                if !notes.is_empty() {
                    item.notes = if item.notes.is_empty() {
                        notes.to_string()
                    } else {
                        format!("{}, {}", item.notes, notes)
                    };
                }
                Ok(item.clone())
            }
            None => {
                let quantity = check_quantity(id, u64::from(quantity))?;
                let item = LineItem {
                    id: id.to_string(),
                    name: name.to_string(),
                    unit_price,
                    quantity,
                    notes: notes.to_string(),
                };
                self.items.push(item.clone());
                Ok(item)
            }
        }
    }

    /// 删除并返回条目；不存在时返回 None
    pub fn remove_item(&mut self, id: &str) -> Option<LineItem> {
        let idx = self.position(id)?;
        Some(self.items.remove(idx))
    }

    /// 设置数量；quantity <= 0 等同 remove_item，超过上限返回 QuantityLimit
    pub fn update_quantity(
        &mut self,
        id: &str,
        quantity: i64,
    ) -> Result<Option<LineItem>, OrderError> {
        if quantity <= 0 {
            return Ok(self.remove_item(id));
        }
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        // quantity > 0，转换不会失败
        let quantity = check_quantity(id, quantity.unsigned_abs())?;
        let item = &mut self.items[idx];
        item.quantity = quantity;
        Ok(Some(item.clone()))
    }

    pub fn get_total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 按名称在车内查找（大小写不敏感的子串匹配），用于 "remove the fries" 这类口语
    pub fn find_by_name(&self, name: &str) -> Option<&LineItem> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.items
            .iter()
            .find(|item| item.name.to_lowercase().contains(&needle))
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn to_summary(&self) -> CartSummary {
        CartSummary {
            items: self.items.clone(),
            total: self.get_total(),
        }
    }

    /// 口播用的多行摘要；currency 为金额前缀符号
    pub fn render(&self, currency: &str) -> String {
        if self.items.is_empty() {
            return "Your cart is empty.".to_string();
        }
        let mut lines = vec!["Here is what you have in your cart:".to_string()];
        for item in &self.items {
            let note = if item.notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", item.notes)
            };
            lines.push(format!(
                "- {}x {}{}: {}{:.2}",
                item.quantity,
                item.name,
                note,
                currency,
                item.line_total()
            ));
        }
        lines.push(format!("Total: {}{:.2}", currency, self.get_total()));
        lines.join("\n")
    }
}
