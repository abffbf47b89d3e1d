//! 工具执行器
//!
//! 持有一个助手的 ToolRegistry 与全局超时。execute 在超时内调用工具，
//! 把 ToolError / 超时 / 未注册转成 AgentError；每次调用输出一行结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::AgentError;
use crate::tools::{Tool, ToolError, ToolRegistry, ToolReply};

pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 未注册返回 HallucinatedTool，超时返回 ToolTimeout，
    /// InvalidArgs 返回 InvalidToolArgs，Failed 返回 ToolExecutionFailed
    pub async fn execute(&self, tool_name: &str, args: serde_json::Value) -> Result<ToolReply, AgentError> {
        let Some(tool) = self.registry.get(tool_name) else {
            tracing::warn!(tool = tool_name, "unknown tool requested");
            return Err(AgentError::HallucinatedTool(tool_name.to_string()));
        };

        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = timeout(self.timeout, tool.execute(args)).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(reply)) if reply.end_call => (true, "ok_end_call"),
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(ToolError::InvalidArgs(_))) => (false, "invalid_args"),
            Ok(Err(ToolError::Failed(_))) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(ToolError::InvalidArgs(reason))) => Err(AgentError::InvalidToolArgs {
                tool: tool_name.to_string(),
                reason,
            }),
            Ok(Err(ToolError::Failed(e))) => Err(AgentError::ToolExecutionFailed(e)),
            Err(_) => Err(AgentError::ToolTimeout(tool_name.to_string())),
        }
    }

    /// 解析并执行一行 `{"tool": "...", "args": {...}}` 调用
    pub async fn execute_call(&self, raw: &str) -> Result<ToolReply, AgentError> {
        let value: serde_json::Value = serde_json::from_str(raw.trim())
            .map_err(|e| AgentError::JsonParseError(e.to_string()))?;
        let tool = value
            .get("tool")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::JsonParseError("missing \"tool\" field".to_string()))?;
        let args = value
            .get("args")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        self.execute(tool, args).await
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.registry.get(name)
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolResult;
    use async_trait::async_trait;
    use serde_json::Value;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn description(&self) -> &'static str {
            "sleeps"
        }

        async fn execute(&self, _args: Value) -> ToolResult {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ToolReply::say("done"))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn description(&self) -> &'static str {
            "fails unless given a mode"
        }

        async fn execute(&self, args: Value) -> ToolResult {
            match args.get("mode").and_then(|v| v.as_str()) {
                None => Err(ToolError::InvalidArgs("missing required parameter: mode".to_string())),
                Some("bye") => Ok(ToolReply::farewell("goodbye")),
                Some(_) => Err(ToolError::Failed("boom".to_string())),
            }
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);
        registry.register(FailingTool);
        ToolExecutor {
            registry,
            timeout: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = executor().execute("nope", Value::Null).await.unwrap_err();
        assert!(matches!(err, AgentError::HallucinatedTool(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = executor().execute("slow", Value::Null).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolTimeout(_)));
    }

    #[tokio::test]
    async fn test_failure_kinds_are_mapped() {
        let exec = executor();
        let err = exec
            .execute("fail", serde_json::json!({"mode": "crash"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolExecutionFailed(msg) if msg == "boom"));

        let err = exec.execute("fail", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidToolArgs { ref tool, ref reason } if tool == "fail" && reason.contains("mode")
        ));

        let reply = exec
            .execute("fail", serde_json::json!({"mode": "bye"}))
            .await
            .unwrap();
        assert!(reply.end_call);
    }

    #[tokio::test]
    async fn test_execute_call_parse_errors() {
        let exec = executor();
        assert!(matches!(
            exec.execute_call("not json").await,
            Err(AgentError::JsonParseError(_))
        ));
        assert!(matches!(
            exec.execute_call(r#"{"args": {}}"#).await,
            Err(AgentError::JsonParseError(_))
        ));
        assert!(matches!(
            exec.execute_call(r#"{"tool": "fail"}"#).await,
            Err(AgentError::InvalidToolArgs { .. })
        ));
    }

    #[test]
    fn test_args_preview_truncates() {
        let long = serde_json::json!({ "text": "x".repeat(500) });
        assert!(args_preview(&long).ends_with("..."));
        assert_eq!(args_preview(&serde_json::json!({})), "{}");
    }
}
