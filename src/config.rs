//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `VOICE_ORDER__*` 覆盖（双下划线表示嵌套，如 `VOICE_ORDER__ORDERS__ORDERS_DIR=/tmp/orders`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::agent::AgentKind;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub orders: OrdersSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub leads: LeadsSection,
    #[serde(default)]
    pub sdr: SdrSection,
    #[serde(default)]
    pub fraud: FraudSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// [app] 段：应用名、启用哪个助手、开场白
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    #[serde(default)]
    pub agent: AgentKind,
    /// 覆盖默认开场白
    pub greeting: Option<String>,
}

/// [orders] 段：订单目录、订单号前缀、金额符号
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersSection {
    #[serde(default = "default_orders_dir")]
    pub orders_dir: PathBuf,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_orders_dir() -> PathBuf {
    PathBuf::from("orders")
}

fn default_id_prefix() -> String {
    "ORD".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for OrdersSection {
    fn default() -> Self {
        Self {
            orders_dir: default_orders_dir(),
            id_prefix: default_id_prefix(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// [catalog] 段：菜单 JSON 路径
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSection {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/catalog.json")
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// [leads] 段：线索文件
#[derive(Debug, Clone, Deserialize)]
pub struct LeadsSection {
    #[serde(default = "default_leads_path")]
    pub path: PathBuf,
}

fn default_leads_path() -> PathBuf {
    PathBuf::from("data/leads.json")
}

impl Default for LeadsSection {
    fn default() -> Self {
        Self {
            path: default_leads_path(),
        }
    }
}

/// [sdr] 段：SDR 知识库（公司介绍、课程线、FAQ）
#[derive(Debug, Clone, Deserialize)]
pub struct SdrSection {
    #[serde(default = "default_sdr_content_path")]
    pub content_path: PathBuf,
}

fn default_sdr_content_path() -> PathBuf {
    PathBuf::from("data/sdr_content.json")
}

impl Default for SdrSection {
    fn default() -> Self {
        Self {
            content_path: default_sdr_content_path(),
        }
    }
}

/// [fraud] 段：SQLite 路径、启动时是否写入示例案件
#[derive(Debug, Clone, Deserialize)]
pub struct FraudSection {
    #[serde(default = "default_fraud_db_path")]
    pub db_path: PathBuf,
    #[serde(default)]
    pub seed_on_start: bool,
}

fn default_fraud_db_path() -> PathBuf {
    PathBuf::from("data/fraud_cases.db")
}

impl Default for FraudSection {
    fn default() -> Self {
        Self {
            db_path: default_fraud_db_path(),
            seed_on_start: false,
        }
    }
}

/// [tools] 段：单次工具调用超时（秒）
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_tool_timeout_secs() -> u64 {
    10
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 VOICE_ORDER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 VOICE_ORDER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("VOICE_ORDER")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
