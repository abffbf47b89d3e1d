//! 创建并写入风控示例案件库
//!
//! 用法：voice-order-seed [config.toml]；库路径取 [fraud].db_path。

use std::path::PathBuf;

use anyhow::Context;
use voice_order::config::load_config;
use voice_order::fraud::FraudCaseStore;
use voice_order::observability;

fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let store = FraudCaseStore::open(&cfg.fraud.db_path)
        .with_context(|| format!("Failed to open {}", cfg.fraud.db_path.display()))?;
    let seeded = store.seed().context("Failed to seed fraud cases")?;
    let total = store.count()?;
    tracing::info!(
        seeded,
        total,
        path = %cfg.fraud.db_path.display(),
        "fraud database ready"
    );
    Ok(())
}
