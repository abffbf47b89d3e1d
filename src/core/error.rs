//! Agent 错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 AgentError 决定 RetryWithPrompt / Apologize / Abort。

use thiserror::Error;

/// 工具分发过程中可能出现的错误（未知工具、参数错误、执行失败、超时、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// 参数被工具拒绝：交还模型修正后重试
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidToolArgs { tool: String, reason: String },

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    /// 模型调用了未注册的工具
    #[error("Hallucinated tool: {0}")]
    HallucinatedTool(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone)]
pub enum RecoveryAction {
    /// 将提示注入下一轮，让模型按正确格式重试
    RetryWithPrompt(String),
    /// 对用户说一句道歉并继续会话
    Apologize(String),
    /// 终止当前会话
    Abort,
}
