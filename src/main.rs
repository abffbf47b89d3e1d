//! voice-order 入口
//!
//! 初始化日志、加载配置、组装当前助手的工具集，然后从 stdin 逐行读取
//! `{"tool": "...", "args": {...}}` 形式的工具调用并把回复写到 stdout；
//! 给模型的重试提示以 `[retry]` 开头，工具要求挂断时结束会话。
//! 这一层替代外部语音框架驱动工具，便于本地联调。

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use voice_order::agent::{create_agent_components, process_tool_call, CallOutcome, SharedResources};
use voice_order::config::load_config;
use voice_order::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;
    let kind = cfg.app.agent;
    tracing::info!(agent = ?kind, name = cfg.app.name.as_deref().unwrap_or("voice-order"), "starting");

    let shared = SharedResources::load(&cfg).context("Failed to load shared resources")?;
    let components =
        create_agent_components(&cfg, kind, &shared).context("Failed to create agent")?;
    tracing::debug!(instructions = %components.instructions, "agent instructions");

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{}\n", components.greeting).as_bytes())
        .await?;
    stdout
        .write_all(format!("(tools: {})\n", components.executor.tool_names().join(", ")).as_bytes())
        .await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        let outcome = process_tool_call(&components, line)
            .await
            .context("Unrecoverable tool error")?;
        let text = match &outcome {
            CallOutcome::Speak(reply) => format!("{reply}\n"),
            CallOutcome::Retry(prompt) => format!("[retry] {prompt}\n"),
        };
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
        if outcome.ends_call() {
            break;
        }
    }

    tracing::info!("session ended");
    Ok(())
}
