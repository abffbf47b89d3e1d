//! 销售线索（SDR 场景）
//!
//! 线索追加写入单个 JSON 数组文件；文件缺失或内容损坏时从空数组重新开始。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("Lead storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lead JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing lead field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    /// Student / Parent
    pub role: String,
    pub grade: String,
    pub target_exam: String,
    pub email: String,
    pub timeline: String,
    pub use_case: String,
    pub team_size: String,
    /// 学校或学院
    pub company: String,
}

impl Lead {
    pub fn new(
        name: &str,
        role: &str,
        grade: &str,
        target_exam: &str,
        email: &str,
    ) -> Result<Self, LeadError> {
        let required = [
            ("name", name),
            ("role", role),
            ("grade", grade),
            ("target_exam", target_exam),
            ("email", email),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(LeadError::MissingField(*field));
        }
        Ok(Self {
            timestamp: Utc::now(),
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            grade: grade.trim().to_string(),
            target_exam: target_exam.trim().to_string(),
            email: email.trim().to_string(),
            timeline: "Not specified".to_string(),
            use_case: "Exam Preparation".to_string(),
            team_size: "Individual".to_string(),
            company: "Not specified".to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LeadStore {
    path: PathBuf,
}

impl LeadStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部线索；文件不存在或不是合法数组时返回空 Vec
    pub fn all(&self) -> Result<Vec<Lead>, LeadError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&data) {
            Ok(leads) => Ok(leads),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "lead file unreadable, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    /// 追加一条线索并整体写回；返回当前线索总数
    pub fn append(&self, lead: Lead) -> Result<usize, LeadError> {
        let mut leads = self.all()?;
        tracing::info!(name = %lead.name, exam = %lead.target_exam, "lead saved");
        leads.push(lead);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&leads)?)?;
        Ok(leads.len())
    }
}
