pub mod args;
pub mod cart;
pub mod executor;
pub mod fraud;
pub mod lead;
pub mod menu;
pub mod registry;
pub mod schema;

pub use cart::{
    AddToCartTool, ClearCartTool, PlaceOrderTool, RemoveFromCartTool, UpdateCartQuantityTool,
    ViewCartTool,
};
pub use executor::ToolExecutor;
pub use fraud::{
    CallVerification, LookupFraudCaseTool, SharedFraudStore, UpdateFraudCaseTool,
    VerifySecurityAnswerTool,
};
pub use lead::SaveLeadTool;
pub use menu::{RecommendMealUpgradeTool, SearchMenuTool};
pub use registry::{Tool, ToolError, ToolRegistry, ToolReply, ToolResult, ToolSpec};
pub use schema::tool_call_schema_json;
