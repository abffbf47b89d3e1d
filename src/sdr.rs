//! SDR 知识库
//!
//! 公司介绍、课程线与 FAQ 从 JSON 文件加载，拼进 SDR 助手的 instructions。
//! 文件缺失或损坏时退回空内容，助手仍可收集线索。

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read SDR content {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid SDR content JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mission: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vertical {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SdrContent {
    pub company_info: CompanyInfo,
    pub verticals: Vec<Vertical>,
    pub faqs: Vec<Faq>,
}

const DEFAULT_COMPANY: &str = "Physics Wallah";

const SDR_GOALS: &str = r#"**YOUR GOAL:**
1. **Qualify the Lead:** Warmly engage with the student or parent. Find out who they are (Student/Parent), their Class/Grade, and what Exam they are targeting (JEE, NEET, Boards, etc.).
2. **Answer Questions:** Use the FAQ and Offerings info to answer questions about courses, pricing (mention affordability), and faculties.
3. **Close:** Once you have their details and have answered their questions, summarize their interest and end the call with high energy ("Padhai Karte Raho!", "All the best!").

**YOUR PERSONA:**
- **Tone:** Professional, Warm, Efficient, and Encouraging. You are an expert Admission Counselor.
- Be concise. Focus on gathering requirements (Class, Exam, Goals) to suggest the best batch.
- Provide clear, accurate information about fee structures and scholarships. If something is not in the knowledge base, say you will have a counselor follow up.

**LEAD CAPTURE:**
You must collect: Name, Role (Student/Parent), Class/Grade, Target Exam, Email, Timeline (When they want to join).
When the user indicates they are done (e.g., "That's all", "Thanks"), or after you have collected all info:
1. Verbally summarize what you have recorded.
2. Call the `save_lead` tool."#;

impl SdrContent {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let content: Self = serde_json::from_str(&data)?;
        tracing::info!(
            verticals = content.verticals.len(),
            faqs = content.faqs.len(),
            path = %path.display(),
            "sdr content loaded"
        );
        Ok(content)
    }

    /// 加载失败只记日志，返回空内容
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load sdr content, using empty knowledge base");
            Self::default()
        })
    }

    pub fn company_name(&self) -> &str {
        self.company_info
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_COMPANY)
    }

    /// SDR 人设：公司概况、课程线、FAQ，然后是目标与线索收集要求
    pub fn render_persona(&self) -> String {
        let mut out = format!(
            "You are a friendly and energetic Sales Development Representative (SDR) for **{}**.\n\n",
            self.company_name()
        );

        let info = &self.company_info;
        if info.description.is_some() || info.mission.is_some() {
            out.push_str("**COMPANY OVERVIEW:**\n");
            if let Some(description) = &info.description {
                out.push_str(description);
                out.push('\n');
            }
            if let Some(mission) = &info.mission {
                out.push_str(&format!("Mission: {mission}\n"));
            }
            out.push('\n');
        }

        if !self.verticals.is_empty() {
            out.push_str("**KEY OFFERINGS:**\n");
            for v in &self.verticals {
                out.push_str(&format!("- {}: {}\n", v.name, v.description));
            }
            out.push('\n');
        }

        if !self.faqs.is_empty() {
            out.push_str("**FAQ KNOWLEDGE BASE:**\n");
            for faq in &self.faqs {
                out.push_str(&format!("Q: {}\nA: {}\n", faq.question, faq.answer));
            }
            out.push('\n');
        }

        out.push_str(SDR_GOALS);
        out
    }
}
