//! 工具契约与注册表
//!
//! 语音侧模型给出 JSON 参数，工具返回 ToolReply：一句要念给用户的话，外加是否就此挂断。
//! 失败分两类：InvalidArgs 把原因交还模型重新调用，Failed 只对用户道歉。
//! 一个助手一张 ToolRegistry，instructions 里的工具清单也由它生成。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// 参数缺失、类型不对或不满足业务约束；原因会回给模型
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// 存储等内部故障；原因只进日志
    #[error("{0}")]
    Failed(String),
}

/// 工具回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub speech: String,
    /// 说完这句即结束通话（线索已保存、核验失败、案件已结案）
    pub end_call: bool,
}

impl ToolReply {
    pub fn say(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            end_call: false,
        }
    }

    pub fn farewell(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            end_call: true,
        }
    }
}

impl fmt::Display for ToolReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.speech)
    }
}

pub type ToolResult = Result<ToolReply, ToolError>;

#[async_trait]
pub trait Tool: Send + Sync {
    /// 模型调用时 "tool" 字段的值
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> ToolResult;
}

/// 工具清单中的一项
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// 一个助手可用的工具，按名称排序
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同名工具已存在时保留原有的并返回 false
    pub fn register(&mut self, tool: impl Tool + 'static) -> bool {
        let name = tool.name();
        if self.tools.contains_key(name) {
            tracing::warn!(tool = name, "duplicate tool registration ignored");
            return false;
        }
        self.tools.insert(name, Arc::new(tool));
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name(),
                description: tool.description(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    /// instructions 中 **TOOLS:** 段落的正文，每个工具一行
    pub fn render_for_instructions(&self) -> String {
        self.tools
            .values()
            .map(|tool| format!("- `{}`: {}\n", tool.name(), tool.description()))
            .collect()
    }

    /// 与注册结果一致的工具 schema（JSON 数组）
    pub fn to_schema_json(&self) -> String {
        serde_json::to_string_pretty(&self.specs()).unwrap_or_else(|_| "[]".to_string())
    }
}
