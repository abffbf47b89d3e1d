//! 线索工具：对话结束时保存 SDR 收集到的信息

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::leads::{Lead, LeadError, LeadStore};
use crate::tools::args::optional_str;
use crate::tools::{Tool, ToolError, ToolReply, ToolResult};

pub struct SaveLeadTool {
    store: LeadStore,
}

impl SaveLeadTool {
    pub fn new(store: LeadStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveLeadTool {
    fn name(&self) -> &'static str {
        "save_lead"
    }

    fn description(&self) -> &'static str {
        "Save the lead's information. Call this at the end of the conversation. Args: {\"name\", \"role\", \"grade\", \"target_exam\", \"email\", \"timeline\"?, \"use_case\"?, \"team_size\"?, \"company\"?}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Full Name"},
                "role": {"type": "string", "description": "Role (Student or Parent)"},
                "grade": {"type": "string", "description": "Class or Grade (e.g., 11th, 12th, Dropper)"},
                "target_exam": {"type": "string", "description": "Target Exam (e.g., JEE, NEET, UPSC)"},
                "email": {"type": "string", "description": "Email Address"},
                "timeline": {"type": "string", "description": "When they plan to join"},
                "use_case": {"type": "string", "description": "Specific goal or use case"},
                "team_size": {"type": "string", "description": "Study group size or 'Individual'"},
                "company": {"type": "string", "description": "School or College Name"}
            },
            "required": ["name", "role", "grade", "target_exam", "email"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let mut lead = Lead::new(
            optional_str(&args, "name"),
            optional_str(&args, "role"),
            optional_str(&args, "grade"),
            optional_str(&args, "target_exam"),
            optional_str(&args, "email"),
        )
        .map_err(|e| match e {
            LeadError::MissingField(_) => ToolError::InvalidArgs(e.to_string()),
            other => ToolError::Failed(other.to_string()),
        })?;

        for (key, slot) in [
            ("timeline", &mut lead.timeline),
            ("use_case", &mut lead.use_case),
            ("team_size", &mut lead.team_size),
            ("company", &mut lead.company),
        ] {
            let value = optional_str(&args, key);
            if !value.is_empty() {
                *slot = value.to_string();
            }
        }

        match self.store.append(lead) {
            Ok(_) => Ok(ToolReply::farewell(
                "Lead saved successfully. All the best for your preparation!",
            )),
            Err(e) => {
                tracing::error!(error = %e, "error saving lead");
                Err(ToolError::Failed(format!("failed to save lead: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_lead() {
        let dir = TempDir::new().unwrap();
        let store = LeadStore::new(dir.path().join("leads.json"));
        let tool = SaveLeadTool::new(store.clone());

        let reply = tool
            .execute(json!({
                "name": "Riya Sharma",
                "role": "Student",
                "grade": "12th",
                "target_exam": "NEET",
                "email": "riya@example.com",
                "timeline": "Next Year"
            }))
            .await
            .unwrap();
        assert!(reply.speech.starts_with("Lead saved successfully"));
        assert!(reply.end_call);

        let leads = store.all().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].timeline, "Next Year");
        assert_eq!(leads[0].company, "Not specified");
    }

    #[tokio::test]
    async fn test_save_lead_missing_field() {
        let dir = TempDir::new().unwrap();
        let tool = SaveLeadTool::new(LeadStore::new(dir.path().join("leads.json")));
        let err = tool.execute(json!({"name": "Riya"})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(ref msg) if msg.contains("role")));
    }
}
