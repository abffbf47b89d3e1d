//! 错误恢复引擎
//!
//! 根据 AgentError 返回 RecoveryAction：工具层的故障（含落盘失败）只换成一句口头道歉，不中断会话。

use crate::core::{AgentError, RecoveryAction};

#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, err: &AgentError) -> RecoveryAction {
        match err {
            AgentError::JsonParseError(raw) => RecoveryAction::RetryWithPrompt(format!(
                "The previous tool call was not valid JSON: {raw}. \
                Reply with exactly one JSON object of the form {{\"tool\": \"name\", \"args\": {{...}}}}, \
                for example {{\"tool\": \"view_cart\", \"args\": {{}}}}."
            )),
            AgentError::HallucinatedTool(name) => RecoveryAction::RetryWithPrompt(format!(
                "There is no tool named '{name}'. Use only the tools listed in your instructions."
            )),
            AgentError::InvalidToolArgs { tool, reason } => RecoveryAction::RetryWithPrompt(format!(
                "The call to '{tool}' was rejected: {reason}. Check its parameters and call it again."
            )),
            AgentError::ToolTimeout(_) => RecoveryAction::Apologize(
                "Sorry, that took longer than expected. Could you say that again?".to_string(),
            ),
            AgentError::ToolExecutionFailed(_) => RecoveryAction::Apologize(
                "I'm sorry, there was an issue on our side. Please try again.".to_string(),
            ),
            AgentError::ConfigError(_) => RecoveryAction::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_json_parse_error() {
        let engine = RecoveryEngine::new();
        let err = AgentError::JsonParseError("invalid json".to_string());
        match engine.handle(&err) {
            RecoveryAction::RetryWithPrompt(msg) => assert!(msg.contains("JSON")),
            _ => panic!("Expected RetryWithPrompt"),
        }
    }

    #[test]
    fn test_recovery_hallucinated_tool() {
        let engine = RecoveryEngine::new();
        let err = AgentError::HallucinatedTool("refund_order".to_string());
        match engine.handle(&err) {
            RecoveryAction::RetryWithPrompt(msg) => assert!(msg.contains("refund_order")),
            _ => panic!("Expected RetryWithPrompt"),
        }
    }

    #[test]
    fn test_recovery_invalid_args_goes_back_to_model() {
        let engine = RecoveryEngine::new();
        let err = AgentError::InvalidToolArgs {
            tool: "add_to_cart".to_string(),
            reason: "missing required parameter: item_name".to_string(),
        };
        match engine.handle(&err) {
            RecoveryAction::RetryWithPrompt(msg) => {
                assert!(msg.contains("add_to_cart"));
                assert!(msg.contains("item_name"));
            }
            _ => panic!("Expected RetryWithPrompt"),
        }
    }

    #[test]
    fn test_recovery_tool_failure_apologizes() {
        let engine = RecoveryEngine::new();
        let err = AgentError::ToolExecutionFailed("disk full".to_string());
        match engine.handle(&err) {
            RecoveryAction::Apologize(msg) => assert!(!msg.contains("disk full")),
            _ => panic!("Expected Apologize"),
        }
        assert!(matches!(
            engine.handle(&AgentError::ToolTimeout("place_order".to_string())),
            RecoveryAction::Apologize(_)
        ));
    }

    #[test]
    fn test_recovery_config_error_aborts() {
        let engine = RecoveryEngine::new();
        let err = AgentError::ConfigError("bad".to_string());
        assert!(matches!(engine.handle(&err), RecoveryAction::Abort));
    }
}
