//! 风控案件库（SQLite，同步）
//!
//! 演示用的固定几条「可疑交易」案件：按用户名查找、模糊匹配口述的用户名、
//! 核验安全问题、回写处理结果。

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FraudError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown case status: {0}")]
    UnknownStatus(String),
}

/// 案件状态（以文本存库）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    PendingReview,
    ConfirmedSafe,
    ConfirmedFraud,
    VerificationFailed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::ConfirmedSafe => "confirmed_safe",
            Self::ConfirmedFraud => "confirmed_fraud",
            Self::VerificationFailed => "verification_failed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = FraudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending_review" => Ok(Self::PendingReview),
            "confirmed_safe" | "safe" => Ok(Self::ConfirmedSafe),
            "confirmed_fraud" | "fraud" => Ok(Self::ConfirmedFraud),
            "verification_failed" => Ok(Self::VerificationFailed),
            other => Err(FraudError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FraudCase {
    pub username: String,
    pub security_identifier: String,
    pub card_ending: String,
    pub status: String,
    pub transaction_name: String,
    pub transaction_amount: String,
    pub transaction_time: String,
    pub transaction_city: String,
    pub transaction_merchant: String,
    pub security_question: String,
    #[serde(skip_serializing)]
    pub security_answer: String,
    pub outcome_note: String,
}

impl FraudCase {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            security_identifier: row.get::<_, Option<String>>("security_identifier")?.unwrap_or_default(),
            card_ending: row.get::<_, Option<String>>("card_ending")?.unwrap_or_default(),
            status: row.get::<_, Option<String>>("status")?.unwrap_or_default(),
            transaction_name: row.get::<_, Option<String>>("transaction_name")?.unwrap_or_default(),
            transaction_amount: row.get::<_, Option<String>>("transaction_amount")?.unwrap_or_default(),
            transaction_time: row.get::<_, Option<String>>("transaction_time")?.unwrap_or_default(),
            transaction_city: row.get::<_, Option<String>>("transaction_city")?.unwrap_or_default(),
            transaction_merchant: row.get::<_, Option<String>>("transaction_merchant")?.unwrap_or_default(),
            security_question: row.get::<_, Option<String>>("security_question")?.unwrap_or_default(),
            security_answer: row.get::<_, Option<String>>("security_answer")?.unwrap_or_default(),
            outcome_note: row.get::<_, Option<String>>("outcome_note")?.unwrap_or_default(),
        })
    }

    /// 库中状态文本解析为 CaseStatus；未知文本返回 None
    pub fn case_status(&self) -> Option<CaseStatus> {
        self.status.parse().ok()
    }

    /// 安全问题核验：去首尾空白、忽略大小写
    pub fn verify_answer(&self, answer: &str) -> bool {
        let expected = self.security_answer.trim();
        !expected.is_empty() && expected.eq_ignore_ascii_case(answer.trim())
    }

    /// 口播用的交易描述（不含答案）
    pub fn describe(&self) -> String {
        format!(
            "A transaction of {} for {} at {} in {} on {}, charged to the card ending {}.",
            self.transaction_amount,
            self.transaction_name,
            self.transaction_merchant,
            self.transaction_city,
            self.transaction_time,
            self.card_ending
        )
    }
}

/// 口述用户名规范化：去空格、去下划线、转小写
pub fn normalize_username(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS fraud_cases (
    username TEXT PRIMARY KEY,
    security_identifier TEXT,
    card_ending TEXT,
    status TEXT,
    transaction_name TEXT,
    transaction_amount TEXT,
    transaction_time TEXT,
    transaction_city TEXT,
    transaction_merchant TEXT,
    security_question TEXT,
    security_answer TEXT,
    outcome_note TEXT
)";

/// (username, security_identifier, card_ending, transaction_name, amount, time, city, merchant, question, answer)
const SEED_CASES: &[[&str; 10]] = &[
    ["john_doe", "12345", "4242", "Electronics Purchase", "₹85,000", "2023-10-27 14:30:00", "New Delhi, India", "Croma Electronics", "What is your mother's maiden name?", "Smith"],
    ["jane_smith", "67890", "8888", "Luxury Hotel Stay", "₹25,000", "2023-10-26 09:15:00", "Mumbai, India", "Taj Mahal Palace", "What was the name of your first pet?", "Fluffy"],
    ["alice_wonder", "11223", "9090", "Crypto Exchange Transfer", "₹50,000", "2023-10-28 03:45:00", "Unknown Location", "WazirX", "What is the name of your favorite teacher?", "Mrs. Johnson"],
    ["bob_builder", "33445", "1212", "Construction Supplies", "₹15,000", "2023-10-25 11:20:00", "Bangalore, India", "Asian Paints Store", "What city were you born in?", "Chicago"],
    ["charlie_brown", "55667", "3434", "Gaming Console", "₹49,990", "2023-10-29 18:10:00", "Hyderabad, India", "Sony Center", "What is your favorite sports team?", "Yankees"],
    ["priyanshujha", "99887", "1818", "VIP Match Tickets", "₹12,500", "2023-11-05 10:00:00", "Ahmedabad, India", "BookMyShow", "Who is your favorite cricketer?", "Virat Kohli"],
    ["reet_singh", "55443", "7777", "International Flight Booking", "₹1,20,000", "2023-11-10 08:00:00", "Chandigarh, India", "MakeMyTrip", "What is your favorite food?", "Butter Chicken"],
];

pub struct FraudCaseStore {
    conn: Connection,
}

impl FraudCaseStore {
    /// 打开（必要时创建）数据库文件及其目录并建表
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FraudError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| FraudError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, FraudError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn init(&self) -> Result<(), FraudError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// 写入示例案件（INSERT OR REPLACE，可重复执行；会把状态重置为 pending_review）
    pub fn seed(&self) -> Result<usize, FraudError> {
        let mut count = 0;
        for case in SEED_CASES {
            let [username, sec_id, card, name, amount, time, city, merchant, question, answer] = *case;
            let res = self.conn.execute(
                "INSERT OR REPLACE INTO fraud_cases (
                    username, security_identifier, card_ending, status,
                    transaction_name, transaction_amount, transaction_time,
                    transaction_city, transaction_merchant, security_question,
                    security_answer, outcome_note
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, '')",
                params![
                    username,
                    sec_id,
                    card,
                    CaseStatus::PendingReview.as_str(),
                    name,
                    amount,
                    time,
                    city,
                    merchant,
                    question,
                    answer
                ],
            );
            match res {
                Ok(n) => count += n,
                Err(e) => tracing::error!(username, error = %e, "failed to seed fraud case"),
            }
        }
        tracing::info!(cases = count, "fraud database seeded");
        Ok(count)
    }

    pub fn get_case(&self, username: &str) -> Result<Option<FraudCase>, FraudError> {
        let case = self
            .conn
            .query_row(
                "SELECT * FROM fraud_cases WHERE username = ?1",
                params![username],
                FraudCase::from_row,
            )
            .optional()?;
        Ok(case)
    }

    /// 忽略空格、下划线与大小写匹配用户名（"John Doe" → john_doe）；首个命中返回
    pub fn find_user_fuzzy(&self, input: &str) -> Result<Option<FraudCase>, FraudError> {
        let wanted = normalize_username(input);
        if wanted.is_empty() {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare("SELECT * FROM fraud_cases ORDER BY rowid")?;
        let rows = stmt.query_map([], FraudCase::from_row)?;
        for row in rows {
            let case = row?;
            if normalize_username(&case.username) == wanted {
                return Ok(Some(case));
            }
        }
        Ok(None)
    }

    /// 回写状态与备注；返回是否有行被更新
    pub fn update_case_status(
        &self,
        username: &str,
        status: CaseStatus,
        note: &str,
    ) -> Result<bool, FraudError> {
        let changed = self.conn.execute(
            "UPDATE fraud_cases SET status = ?1, outcome_note = ?2 WHERE username = ?3",
            params![status.as_str(), note, username],
        )?;
        if changed > 0 {
            tracing::info!(username, status = %status, "fraud case updated");
        } else {
            tracing::warn!(username, "fraud case not found for update");
        }
        Ok(changed > 0)
    }

    pub fn count(&self) -> Result<usize, FraudError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fraud_cases", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
