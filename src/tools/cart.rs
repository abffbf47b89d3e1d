//! 点单工具：加购、删除、改数量、查看、清空、下单
//!
//! 都持有同一个 Arc<OrderSession>；菜单名称解析走 Catalog::resolve。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::order::{OrderError, MAX_LINE_QUANTITY};
use crate::session::OrderSession;
use crate::tools::args::{int_arg, optional_str, required_str};
use crate::tools::{Tool, ToolError, ToolReply, ToolResult};

/// 超过单行上限时念给用户的话
fn limit_reply(name: &str) -> String {
    format!("Sorry, I can add at most {MAX_LINE_QUANTITY} of {name} to one order.")
}

pub struct AddToCartTool {
    session: Arc<OrderSession>,
}

impl AddToCartTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for AddToCartTool {
    fn name(&self) -> &'static str {
        "add_to_cart"
    }

    fn description(&self) -> &'static str {
        "Add an item to the cart. Tries to match item_name to the menu. Args: {\"item_name\": \"Whopper\", \"quantity\": 1, \"notes\": \"no onions\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {"type": "string", "description": "The name of the item to add"},
                "quantity": {"type": "integer", "minimum": 1, "maximum": MAX_LINE_QUANTITY, "description": "The quantity to add"},
                "notes": {"type": "string", "description": "Any special notes (e.g., 'no onions')"}
            },
            "required": ["item_name"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let item_name = required_str(&args, "item_name")?;
        let quantity = int_arg(&args, "quantity")?.unwrap_or(1);
        if quantity < 1 {
            return Err(ToolError::InvalidArgs(format!("quantity must be at least 1, got {quantity}")));
        }
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q <= MAX_LINE_QUANTITY => q,
            _ => {
                return Err(ToolError::InvalidArgs(format!(
                    "quantity must be at most {MAX_LINE_QUANTITY}, got {quantity}"
                )))
            }
        };
        let notes = optional_str(&args, "notes");

        let Some(item) = self.session.catalog().resolve(item_name).item() else {
            tracing::info!(item_name, "menu lookup missed");
            return Ok(ToolReply::say(format!(
                "I couldn't find '{item_name}' in our menu. We have favorites like the Whopper, Chicken Royale, and more."
            )));
        };

        let mut cart = self.session.cart().await;
        if let Err(e) = cart.add_item(&item.id, &item.name, item.price, quantity, notes) {
            tracing::info!(item_id = %item.id, quantity, error = %e, "add rejected");
            return Ok(ToolReply::say(limit_reply(&item.name)));
        }
        let total = cart.get_total();
        tracing::info!(item_id = %item.id, quantity, "added to cart");
        Ok(ToolReply::say(format!(
            "Added {}x {} to cart. Total: {}",
            quantity,
            item.name,
            self.session.format_amount(total)
        )))
    }
}

pub struct RemoveFromCartTool {
    session: Arc<OrderSession>,
}

impl RemoveFromCartTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for RemoveFromCartTool {
    fn name(&self) -> &'static str {
        "remove_from_cart"
    }

    fn description(&self) -> &'static str {
        "Remove an item from the cart by name. Args: {\"item_name\": \"fries\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {"type": "string", "description": "The name of the item to remove"}
            },
            "required": ["item_name"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let item_name = required_str(&args, "item_name")?;
        let mut cart = self.session.cart().await;
        let id = cart.find_by_name(item_name).map(|item| item.id.clone());
        let reply = match id.and_then(|id| cart.remove_item(&id)) {
            Some(removed) => format!("Removed {} from your cart.", removed.name),
            None => format!("I couldn't find '{item_name}' in your cart."),
        };
        Ok(ToolReply::say(reply))
    }
}

pub struct UpdateCartQuantityTool {
    session: Arc<OrderSession>,
}

impl UpdateCartQuantityTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for UpdateCartQuantityTool {
    fn name(&self) -> &'static str {
        "update_cart_quantity"
    }

    fn description(&self) -> &'static str {
        "Set the quantity of an item already in the cart; 0 removes it. Args: {\"item_name\": \"Pepsi\", \"quantity\": 2}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {"type": "string", "description": "The name of the item in the cart"},
                "quantity": {"type": "integer", "maximum": MAX_LINE_QUANTITY, "description": "The new quantity"}
            },
            "required": ["item_name", "quantity"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let item_name = required_str(&args, "item_name")?;
        let quantity = int_arg(&args, "quantity")?
            .ok_or_else(|| ToolError::InvalidArgs("missing required parameter: quantity".to_string()))?;

        let mut cart = self.session.cart().await;
        let Some(id) = cart.find_by_name(item_name).map(|item| item.id.clone()) else {
            return Ok(ToolReply::say(format!("I couldn't find '{item_name}' in your cart.")));
        };
        let updated = match cart.update_quantity(&id, quantity) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::info!(item_id = %id, quantity, error = %e, "update rejected");
                return Ok(ToolReply::say(limit_reply(item_name)));
            }
        };
        let reply = match updated {
            Some(item) if quantity <= 0 => format!("Removed {} from your cart.", item.name),
            Some(item) => format!("Updated {} to {}.", item.name, item.quantity),
            None => format!("I couldn't find '{item_name}' in your cart."),
        };
        Ok(ToolReply::say(format!(
            "{reply} Total: {}",
            self.session.format_amount(cart.get_total())
        )))
    }
}

pub struct ViewCartTool {
    session: Arc<OrderSession>,
}

impl ViewCartTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ViewCartTool {
    fn name(&self) -> &'static str {
        "view_cart"
    }

    fn description(&self) -> &'static str {
        "Get the current status of the cart. No args."
    }

    async fn execute(&self, _args: Value) -> ToolResult {
        Ok(ToolReply::say(
            self.session.cart().await.render(self.session.currency()),
        ))
    }
}

pub struct ClearCartTool {
    session: Arc<OrderSession>,
}

impl ClearCartTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ClearCartTool {
    fn name(&self) -> &'static str {
        "clear_cart"
    }

    fn description(&self) -> &'static str {
        "Remove everything from the cart. No args."
    }

    async fn execute(&self, _args: Value) -> ToolResult {
        self.session.cart().await.clear();
        Ok(ToolReply::say("Your cart is now empty."))
    }
}

pub struct PlaceOrderTool {
    session: Arc<OrderSession>,
}

impl PlaceOrderTool {
    pub fn new(session: Arc<OrderSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for PlaceOrderTool {
    fn name(&self) -> &'static str {
        "place_order"
    }

    fn description(&self) -> &'static str {
        "Finalize the order and save it. Optional args: {\"customer_info\": {\"name\": \"...\"}}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_info": {"type": "object", "description": "Optional customer details"}
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let customer_info = args
            .get("customer_info")
            .and_then(|v| v.as_object())
            .cloned();
        match self.session.checkout(customer_info).await {
            Ok(checkout) => Ok(ToolReply::say(format!(
                "Order placed successfully! Order ID is {}. Total amount: {}. Thank you for choosing Burger King!",
                checkout.order_id,
                self.session.format_amount(checkout.total)
            ))),
            Err(OrderError::EmptyCart) => Ok(ToolReply::say(
                "Your cart is empty. I can't place an empty order.",
            )),
            Err(e) => {
                tracing::error!(error = %e, "failed to place order");
                Err(ToolError::Failed(format!("failed to place order: {e}")))
            }
        }
    }
}
