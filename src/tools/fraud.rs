//! 风控外呼工具：查案件、核验安全问题、回写结果
//!
//! Connection 不是 Sync，库放在 std Mutex 里；查询都很短，不跨 await 持锁。
//! 交易详情只在本通电话核验通过之后给出，核验状态由 CallVerification 按通话保存。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::fraud::{CaseStatus, FraudCase, FraudCaseStore};
use crate::tools::args::{optional_str, required_str};
use crate::tools::{Tool, ToolError, ToolReply, ToolResult};

pub type SharedFraudStore = Arc<Mutex<FraudCaseStore>>;

const LOCKED_REPLY: &str = "For your security, this account can't be verified over the phone after a failed attempt. Please visit your nearest branch with a photo ID. Goodbye.";

/// 一通电话内已通过安全问题核验的用户名
#[derive(Debug, Default)]
pub struct CallVerification {
    verified: Mutex<HashSet<String>>,
}

impl CallVerification {
    pub fn new() -> Self {
        Self::default()
    }

    fn mark_verified(&self, username: &str) -> Result<(), ToolError> {
        self.verified
            .lock()
            .map_err(|_| ToolError::Failed("verification state lock poisoned".to_string()))?
            .insert(username.to_string());
        Ok(())
    }

    pub fn is_verified(&self, username: &str) -> bool {
        self.verified
            .lock()
            .map(|set| set.contains(username))
            .unwrap_or(false)
    }
}

fn username_schema() -> Value {
    json!({"type": "string", "description": "The customer's username as they said it"})
}

fn find_case(store: &SharedFraudStore, username: &str) -> Result<Option<FraudCase>, ToolError> {
    let store = store
        .lock()
        .map_err(|_| ToolError::Failed("fraud store lock poisoned".to_string()))?;
    store
        .find_user_fuzzy(username)
        .map_err(|e| ToolError::Failed(e.to_string()))
}

fn set_status(
    store: &SharedFraudStore,
    username: &str,
    status: CaseStatus,
    note: &str,
) -> Result<(), ToolError> {
    let store = store
        .lock()
        .map_err(|_| ToolError::Failed("fraud store lock poisoned".to_string()))?;
    store
        .update_case_status(username, status, note)
        .map_err(|e| ToolError::Failed(e.to_string()))?;
    Ok(())
}

fn not_found(username: &str) -> ToolReply {
    ToolReply::say(format!("I couldn't find an account for '{username}'."))
}

pub struct LookupFraudCaseTool {
    store: SharedFraudStore,
}

impl LookupFraudCaseTool {
    pub fn new(store: SharedFraudStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for LookupFraudCaseTool {
    fn name(&self) -> &'static str {
        "lookup_fraud_case"
    }

    fn description(&self) -> &'static str {
        "Find the customer's case by username (spaces/underscores/case ignored) and get their security question. Args: {\"username\": \"John Doe\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"username": username_schema()},
            "required": ["username"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let username = required_str(&args, "username")?;
        let Some(case) = find_case(&self.store, username)? else {
            return Ok(not_found(username));
        };
        if case.case_status() == Some(CaseStatus::VerificationFailed) {
            return Ok(ToolReply::farewell(LOCKED_REPLY));
        }
        Ok(ToolReply::say(format!(
            "Found account {}. Before I share any details, please answer your security question: {}",
            case.username, case.security_question
        )))
    }
}

pub struct VerifySecurityAnswerTool {
    store: SharedFraudStore,
    call: Arc<CallVerification>,
}

impl VerifySecurityAnswerTool {
    pub fn new(store: SharedFraudStore, call: Arc<CallVerification>) -> Self {
        Self { store, call }
    }
}

#[async_trait]
impl Tool for VerifySecurityAnswerTool {
    fn name(&self) -> &'static str {
        "verify_security_answer"
    }

    fn description(&self) -> &'static str {
        "Check the customer's answer to their security question. On success returns the flagged transaction; a wrong answer locks the case and ends the call. Args: {\"username\": \"john_doe\", \"answer\": \"Smith\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "username": username_schema(),
                "answer": {"type": "string", "description": "The customer's answer"}
            },
            "required": ["username", "answer"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let username = required_str(&args, "username")?;
        let answer = required_str(&args, "answer")?;
        let Some(case) = find_case(&self.store, username)? else {
            return Ok(not_found(username));
        };

        // 一次答错即锁定，之后答对也不再放行
        if case.case_status() == Some(CaseStatus::VerificationFailed) {
            tracing::warn!(username = %case.username, "verification attempted on locked case");
            return Ok(ToolReply::farewell(LOCKED_REPLY));
        }

        if case.verify_answer(answer) {
            self.call.mark_verified(&case.username)?;
            tracing::info!(username = %case.username, "caller verified");
            Ok(ToolReply::say(format!(
                "Thank you, you're verified. {} Did you make this transaction?",
                case.describe()
            )))
        } else {
            set_status(
                &self.store,
                &case.username,
                CaseStatus::VerificationFailed,
                "Security answer did not match",
            )?;
            tracing::warn!(username = %case.username, "security answer did not match");
            Ok(ToolReply::farewell(
                "I'm sorry, that doesn't match our records, so I can't discuss this account. Please visit your nearest branch with a photo ID. Goodbye.",
            ))
        }
    }
}

pub struct UpdateFraudCaseTool {
    store: SharedFraudStore,
    call: Arc<CallVerification>,
}

impl UpdateFraudCaseTool {
    pub fn new(store: SharedFraudStore, call: Arc<CallVerification>) -> Self {
        Self { store, call }
    }
}

#[async_trait]
impl Tool for UpdateFraudCaseTool {
    fn name(&self) -> &'static str {
        "update_fraud_case"
    }

    fn description(&self) -> &'static str {
        "Record the outcome after the customer is verified. status: confirmed_safe | confirmed_fraud. Args: {\"username\": \"john_doe\", \"status\": \"confirmed_safe\", \"note\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "username": username_schema(),
                "status": {"type": "string", "enum": ["confirmed_safe", "confirmed_fraud"]},
                "note": {"type": "string", "description": "Short outcome note"}
            },
            "required": ["username", "status"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let username = required_str(&args, "username")?;
        let status: CaseStatus = required_str(&args, "status")?
            .parse()
            .map_err(|e: crate::fraud::FraudError| ToolError::InvalidArgs(e.to_string()))?;
        if !matches!(status, CaseStatus::ConfirmedSafe | CaseStatus::ConfirmedFraud) {
            return Err(ToolError::InvalidArgs(format!(
                "status must be confirmed_safe or confirmed_fraud, got {status}"
            )));
        }
        let note = optional_str(&args, "note");

        let Some(case) = find_case(&self.store, username)? else {
            return Ok(not_found(username));
        };
        if !self.call.is_verified(&case.username) {
            return Err(ToolError::InvalidArgs(format!(
                "{} has not been verified on this call; ask the security question and call verify_security_answer first",
                case.username
            )));
        }
        set_status(&self.store, &case.username, status, note)?;
        Ok(ToolReply::farewell(match status {
            CaseStatus::ConfirmedFraud => "The card has been blocked and a replacement will be issued. The case is marked as fraudulent. Thank you for your time.".to_string(),
            _ => format!("Thanks for confirming. The case is marked as {status}. Have a great day."),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SharedFraudStore {
        let store = FraudCaseStore::open_in_memory().unwrap();
        store.seed().unwrap();
        Arc::new(Mutex::new(store))
    }

    fn status_of(s: &SharedFraudStore, username: &str) -> String {
        s.lock().unwrap().get_case(username).unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_lookup_reveals_only_the_question() {
        let tool = LookupFraudCaseTool::new(store());
        let reply = tool.execute(json!({"username": "Jane Smith"})).await.unwrap();
        assert!(reply.speech.contains("jane_smith"));
        assert!(reply.speech.contains("first pet"));
        for secret in ["Fluffy", "₹25,000", "Taj Mahal Palace", "Mumbai", "8888"] {
            assert!(!reply.speech.contains(secret), "leaked {secret}");
        }
        assert!(!reply.end_call);

        let reply = tool.execute(json!({"username": "nobody"})).await.unwrap();
        assert!(reply.speech.contains("couldn't find"));
    }

    #[tokio::test]
    async fn test_correct_answer_reveals_transaction() {
        let s = store();
        let call = Arc::new(CallVerification::new());
        let reply = VerifySecurityAnswerTool::new(s.clone(), call.clone())
            .execute(json!({"username": "jane smith", "answer": " fluffy "}))
            .await
            .unwrap();
        assert!(reply.speech.contains("Taj Mahal Palace"));
        assert!(reply.speech.contains("8888"));
        assert!(call.is_verified("jane_smith"));
        assert_eq!(status_of(&s, "jane_smith"), "pending_review");
    }

    #[tokio::test]
    async fn test_wrong_answer_locks_case() {
        let s = store();
        let call = Arc::new(CallVerification::new());
        let tool = VerifySecurityAnswerTool::new(s.clone(), call.clone());
        let reply = tool
            .execute(json!({"username": "john doe", "answer": "Jones"}))
            .await
            .unwrap();
        assert!(reply.end_call);
        assert!(!reply.speech.contains("Croma"));
        assert_eq!(status_of(&s, "john_doe"), "verification_failed");

        // 之后答对也不放行
        let reply = tool
            .execute(json!({"username": "john_doe", "answer": "smith"}))
            .await
            .unwrap();
        assert!(reply.end_call);
        assert!(!reply.speech.contains("Croma"));
        assert!(!call.is_verified("john_doe"));

        let reply = LookupFraudCaseTool::new(s.clone())
            .execute(json!({"username": "john_doe"}))
            .await
            .unwrap();
        assert!(reply.end_call);
        assert!(!reply.speech.contains("maiden name"));
    }

    #[tokio::test]
    async fn test_update_requires_verified_caller() {
        let s = store();
        let call = Arc::new(CallVerification::new());
        let update = UpdateFraudCaseTool::new(s.clone(), call.clone());

        let err = update
            .execute(json!({"username": "Charlie Brown", "status": "confirmed_fraud"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(ref msg) if msg.contains("verify_security_answer")));
        assert_eq!(status_of(&s, "charlie_brown"), "pending_review");

        VerifySecurityAnswerTool::new(s.clone(), call.clone())
            .execute(json!({"username": "charlie_brown", "answer": "yankees"}))
            .await
            .unwrap();
        let reply = update
            .execute(json!({"username": "Charlie Brown", "status": "confirmed_fraud", "note": "not me"}))
            .await
            .unwrap();
        assert!(reply.speech.contains("blocked"));
        assert!(reply.end_call);
        let case = s.lock().unwrap().get_case("charlie_brown").unwrap().unwrap();
        assert_eq!(case.status, "confirmed_fraud");
        assert_eq!(case.outcome_note, "not me");
    }

    #[tokio::test]
    async fn test_update_rejects_non_outcome_status() {
        let s = store();
        let call = Arc::new(CallVerification::new());
        let update = UpdateFraudCaseTool::new(s, call);
        for status in ["whatever", "pending_review", "verification_failed"] {
            let err = update
                .execute(json!({"username": "charlie_brown", "status": status}))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArgs(_)), "accepted {status}");
        }
    }
}
