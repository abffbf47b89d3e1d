//! voice-order - 语音点单 / 线索收集助手的业务内核
//!
//! 语音会话（STT、TTS、轮次检测、LLM）由外部实时语音框架负责，本 crate 提供它以「工具」形式调用的部分。
//!
//! 模块划分：
//! - **agent**: 按助手类型组装 instructions、开场白与工具集
//! - **catalog**: 只读菜单与名称解析（精确 → 前缀 → 子串）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 工具分发错误与恢复
//! - **fraud**: SQLite 风控案件库
//! - **leads**: 销售线索 JSON 存储
//! - **observability**: 日志初始化
//! - **order**: 购物车、订单号、订单落盘
//! - **sdr**: SDR 知识库（公司介绍、课程线、FAQ）
//! - **session**: 单个点单会话（独占购物车）
//! - **tools**: 工具 trait、注册表、执行器与各业务工具

pub mod agent;
pub mod catalog;
pub mod config;
pub mod core;
pub mod fraud;
pub mod leads;
pub mod observability;
pub mod order;
pub mod sdr;
pub mod session;
pub mod tools;

pub use order::{Cart, LineItem, Order, OrderError, OrderManager};
