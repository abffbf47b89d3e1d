//! 菜单工具：查菜单、套餐升级建议

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::session::OrderSession;
use crate::tools::args::{optional_str, required_str};
use crate::tools::{Tool, ToolReply, ToolResult};

pub struct SearchMenuTool {
    session: Arc<OrderSession>,
}

impl SearchMenuTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SearchMenuTool {
    fn name(&self) -> &'static str {
        "search_menu"
    }

    fn description(&self) -> &'static str {
        "List menu items whose name or category matches a keyword. Args: {\"keyword\": \"burger\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keyword": {"type": "string", "description": "Item name or category to look for"}
            },
            "required": ["keyword"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let keyword = required_str(&args, "keyword")?;
        let hits = self.session.catalog().search(keyword);
        if hits.is_empty() {
            return Ok(ToolReply::say(format!(
                "We don't have anything matching '{keyword}' on the menu."
            )));
        }
        let lines: Vec<String> = hits
            .iter()
            .take(10)
            .map(|item| format!("- {}: {}", item.name, self.session.format_amount(item.price)))
            .collect();
        Ok(ToolReply::say(lines.join("\n")))
    }
}

/// 套餐升级：车里缺薯条或饮料时建议补上，不自动加购
pub struct RecommendMealUpgradeTool {
    session: Arc<OrderSession>,
}

impl RecommendMealUpgradeTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

const SIDE_SUGGESTION: (&str, &str) = ("fries", "Fries (Medium)");
const DRINK_SUGGESTION: (&str, &str) = ("pepsi", "Pepsi (Medium)");

#[async_trait]
impl Tool for RecommendMealUpgradeTool {
    fn name(&self) -> &'static str {
        "recommend_meal_upgrade"
    }

    fn description(&self) -> &'static str {
        "Suggest adding fries and a drink to make it a meal. Args: {\"base_item\": \"burger\"}"
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let base_item = optional_str(&args, "base_item");
        tracing::info!(base_item, "meal upgrade requested");

        let cart = self.session.cart().await;
        let in_cart = |keyword: &str| {
            cart.items()
                .iter()
                .any(|item| item.name.to_lowercase().contains(keyword))
        };
        let suggestions: Vec<&str> = [SIDE_SUGGESTION, DRINK_SUGGESTION]
            .into_iter()
            .filter(|(keyword, _)| !in_cart(*keyword))
            .map(|(_, label)| label)
            .collect();

        let reply = if suggestions.is_empty() {
            "You've got a great meal there! Anything else?".to_string()
        } else {
            format!(
                "Would you like to make that a meal by adding {}?",
                suggestions.join(", ")
            )
        };
        Ok(ToolReply::say(reply))
    }
}
