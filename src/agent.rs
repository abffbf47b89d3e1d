//! Headless Agent 运行时
//!
//! 语音框架（STT / TTS / 轮次检测 / LLM）在外部；这里只负责每个会话的
//! instructions、开场白与工具集：
//! create_agent_components 按 AgentKind 组装 ToolRegistry / ToolExecutor / RecoveryEngine，
//! process_tool_call 执行一次工具调用：回复交给 TTS，参数 / 格式错误交还模型重试。

use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::core::{AgentError, RecoveryAction, RecoveryEngine};
use crate::fraud::FraudCaseStore;
use crate::leads::LeadStore;
use crate::order::OrderManager;
use crate::sdr::SdrContent;
use crate::session::OrderSession;
use crate::tools::{
    tool_call_schema_json, AddToCartTool, CallVerification, ClearCartTool, LookupFraudCaseTool,
    PlaceOrderTool, RecommendMealUpgradeTool, RemoveFromCartTool, SaveLeadTool, SearchMenuTool,
    ToolExecutor, ToolRegistry, ToolReply, UpdateCartQuantityTool, UpdateFraudCaseTool,
    VerifySecurityAnswerTool, ViewCartTool,
};

/// 启用哪一个助手
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// 快餐点单
    #[default]
    Ordering,
    /// 课程顾问 / 线索收集
    Sdr,
    /// 风控外呼核实
    Fraud,
}

impl AgentKind {
    pub fn greeting(&self) -> &'static str {
        match self {
            Self::Ordering => "Welcome to Burger King! Home of the Whopper. What can I get for you today?",
            Self::Sdr => "Hello! Welcome to Physics Wallah's Admission Cell. I am your AI Counselor. I can help you find the perfect course and batch for your goals. To get started, may I know your name?",
            Self::Fraud => "Hello, this is the fraud prevention team calling about a recent transaction on your card. May I have your username, please?",
        }
    }
}

const ORDERING_INTRO: &str = r#"You are a **Burger King Ordering Assistant**.

**YOUR GOAL:**
Help users order flame-grilled burgers, fries, and beverages.

**CAPABILITIES:**
1. **Add Items:** Add specific items to the cart (e.g., "I want a Whopper").
2. **Recommend Combos:** If a user asks for a burger, suggest adding fries and a drink to make it a meal.
3. **Manage Cart:** Remove items, update quantities, or clear the cart.
4. **Check Cart:** List what's in the cart.
5. **Checkout:** Confirm the order and save it."#;

const ORDERING_TONE: &str = r#"If a user asks for something not on the menu, politely say you serve the best flame-grilled burgers.

**TONE:**
- Bold, confident, and fun ("Have it your way!").
- Confirm actions clearly.
- Always upsell politely.
- When the user says "that's all" or "place order", summarize the cart and ask for confirmation."#;

const FRAUD_PERSONA: &str = r#"You are a calm, professional **Fraud Alert Representative** for the bank.

**CALL FLOW:**
1. Ask for the customer's username and call `lookup_fraud_case`; it returns only their security question.
2. Ask the security question and call `verify_security_answer`. Transaction details are returned only after a correct answer.
3. If verification fails, the call ends; do not discuss the account.
4. If verified, read out the flagged transaction and ask whether they made it.
5. Call `update_fraud_case` with confirmed_safe or confirmed_fraud and a short note.

Never ask for full card numbers, PINs, or passwords."#;

/// 预构建的 Agent 组件：instructions、ToolExecutor、Recovery；每个会话一份
pub struct AgentComponents {
    pub kind: AgentKind,
    pub instructions: String,
    pub greeting: String,
    pub executor: ToolExecutor,
    pub recovery: RecoveryEngine,
    /// 点单会话（仅 Ordering）
    pub session: Option<Arc<OrderSession>>,
}

/// 跨会话共享的只读 / 外部资源，由进程启动时加载一次
#[derive(Clone)]
pub struct SharedResources {
    pub catalog: Arc<Catalog>,
    pub sdr_content: Arc<SdrContent>,
    pub fraud_store: Option<Arc<Mutex<FraudCaseStore>>>,
}

impl SharedResources {
    /// 菜单与风控库一起加载；菜单 / SDR 知识库加载失败时退回空内容，风控库打不开则报错
    pub fn load(cfg: &AppConfig) -> Result<Self, AgentError> {
        let catalog = match Catalog::load(&cfg.catalog.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to load catalog, using empty menu");
                Catalog::default()
            }
        };

        let sdr_content = if cfg.app.agent == AgentKind::Sdr {
            SdrContent::load_or_default(&cfg.sdr.content_path)
        } else {
            SdrContent::default()
        };

        let fraud_store = if cfg.app.agent == AgentKind::Fraud {
            let store = FraudCaseStore::open(&cfg.fraud.db_path)
                .map_err(|e| AgentError::ConfigError(e.to_string()))?;
            if cfg.fraud.seed_on_start {
                store
                    .seed()
                    .map_err(|e| AgentError::ConfigError(e.to_string()))?;
            }
            Some(Arc::new(Mutex::new(store)))
        } else {
            None
        };

        Ok(Self {
            catalog: Arc::new(catalog),
            sdr_content: Arc::new(sdr_content),
            fraud_store,
        })
    }
}

/// 点单人设中的 CATALOG 段：菜单里分类为 Deals 的套餐
fn render_deals(catalog: &Catalog, currency: &str) -> String {
    let deals: Vec<String> = catalog
        .items()
        .iter()
        .filter(|item| {
            item.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case("deals"))
        })
        .map(|item| match item.description.as_deref() {
            Some(desc) => format!("- **{}** ({}{:.2}): {}.", item.name, currency, item.price, desc),
            None => format!("- **{}** ({}{:.2}).", item.name, currency, item.price),
        })
        .collect();
    if deals.is_empty() {
        return String::new();
    }
    format!(
        "**CATALOG:**\nYou have access to the Burger King menu, including these **SPECIAL DEALS**:\n{}\n\n",
        deals.join("\n")
    )
}

fn persona(kind: AgentKind, cfg: &AppConfig, shared: &SharedResources) -> String {
    match kind {
        AgentKind::Ordering => format!(
            "{ORDERING_INTRO}\n\n{}{ORDERING_TONE}",
            render_deals(&shared.catalog, &cfg.orders.currency_symbol)
        ),
        AgentKind::Sdr => shared.sdr_content.render_persona(),
        AgentKind::Fraud => FRAUD_PERSONA.to_string(),
    }
}

/// 组装 instructions：人设 + 可用工具 + 调用格式
pub fn build_instructions(persona: &str, registry: &ToolRegistry) -> String {
    let mut out = String::from(persona);
    out.push_str("\n\n**TOOLS:**\n");
    out.push_str(&registry.render_for_instructions());
    out.push_str("\nTool call format (JSON Schema):\n");
    out.push_str(&tool_call_schema_json());
    out
}

/// 创建一个会话的 Agent 组件
pub fn create_agent_components(
    cfg: &AppConfig,
    kind: AgentKind,
    shared: &SharedResources,
) -> Result<AgentComponents, AgentError> {
    let mut tools = ToolRegistry::new();
    let mut session = None;

    match kind {
        AgentKind::Ordering => {
            let orders = OrderManager::new(&cfg.orders.orders_dir)
                .with_id_prefix(cfg.orders.id_prefix.clone())
                .map_err(|e| AgentError::ConfigError(e.to_string()))?;
            let s = Arc::new(OrderSession::new(
                orders,
                shared.catalog.clone(),
                cfg.orders.currency_symbol.clone(),
            ));
            tools.register(AddToCartTool::new(s.clone()));
            tools.register(RemoveFromCartTool::new(s.clone()));
            tools.register(UpdateCartQuantityTool::new(s.clone()));
            tools.register(ViewCartTool::new(s.clone()));
            tools.register(ClearCartTool::new(s.clone()));
            tools.register(PlaceOrderTool::new(s.clone()));
            tools.register(RecommendMealUpgradeTool::new(s.clone()));
            tools.register(SearchMenuTool::new(s.clone()));
            session = Some(s);
        }
        AgentKind::Sdr => {
            tools.register(SaveLeadTool::new(LeadStore::new(&cfg.leads.path)));
        }
        AgentKind::Fraud => {
            let store = shared.fraud_store.clone().ok_or_else(|| {
                AgentError::ConfigError("fraud agent requires the fraud case database".to_string())
            })?;
            let call = Arc::new(CallVerification::new());
            tools.register(LookupFraudCaseTool::new(store.clone()));
            tools.register(VerifySecurityAnswerTool::new(store.clone(), call.clone()));
            tools.register(UpdateFraudCaseTool::new(store, call));
        }
    }

    let instructions = build_instructions(&persona(kind, cfg, shared), &tools);
    let greeting = cfg
        .app
        .greeting
        .clone()
        .unwrap_or_else(|| kind.greeting().to_string());

    Ok(AgentComponents {
        kind,
        instructions,
        greeting,
        executor: ToolExecutor::new(tools, cfg.tools.tool_timeout_secs),
        recovery: RecoveryEngine::new(),
        session,
    })
}

/// 一次工具调用的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// 念给用户
    Speak(ToolReply),
    /// 交还模型，按提示重新发起调用
    Retry(String),
}

impl CallOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Speak(reply) => &reply.speech,
            Self::Retry(prompt) => prompt,
        }
    }

    pub fn ends_call(&self) -> bool {
        matches!(self, Self::Speak(reply) if reply.end_call)
    }
}

/// 执行一次原始工具调用（一行 JSON）；工具故障变成一句道歉，参数 / 格式错误变成给模型的重试提示
pub async fn process_tool_call(components: &AgentComponents, raw: &str) -> Result<CallOutcome, AgentError> {
    match components.executor.execute_call(raw).await {
        Ok(reply) => Ok(CallOutcome::Speak(reply)),
        Err(err) => match components.recovery.handle(&err) {
            RecoveryAction::Apologize(msg) => {
                tracing::warn!(error = %err, "tool failed, apologizing");
                Ok(CallOutcome::Speak(ToolReply::say(msg)))
            }
            RecoveryAction::RetryWithPrompt(prompt) => {
                tracing::info!(error = %err, "asking model to retry");
                Ok(CallOutcome::Retry(prompt))
            }
            RecoveryAction::Abort => Err(err),
        },
    }
}
