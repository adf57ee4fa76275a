//! 配置组装服务 - 业务能力层
//!
//! 只负责把"配置文件 / 预算文件 / 内联预算 / 额外请求头"整理成引擎能用的形式，
//! 不接触浏览器，也不调用引擎
//!
//! 优先级：
//! 1. `configPath` 作为基础配置
//! 2. `budgetPath` 原样写入 `settings.budgets`
//! 3. 没有 `budgetPath` 时才使用内联 `budget`

use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::models::loaders::{load_json_file, read_text_file};
use crate::models::{AnalysisConfig, AnalysisFlags, BudgetProfile};

/// 组装分析配置
///
/// 没有任何配置或预算输入时返回 `None`，由引擎使用自身默认配置
pub async fn assemble_config(flags: &AnalysisFlags) -> Result<Option<AnalysisConfig>, ConfigError> {
    let mut config = match flags.config_path.as_deref() {
        Some(path) => Some(load_config(path).await?),
        None => None,
    };

    if let Some(budget_path) = flags.budget_path.as_deref() {
        let budgets = load_json_file(budget_path).await?;
        info!("📋 使用预算文件: {}", budget_path.display());

        let mut with_budgets = AnalysisConfig::with_defaults(config.take())?;
        with_budgets.set_budgets(budgets)?;
        config = Some(with_budgets);
    } else if let Some(budget) = flags.budget.as_ref() {
        let profile = BudgetProfile::from_inline(budget)?;
        debug!(
            "内联预算: {} 条数量预算, {} 条大小预算",
            profile.resource_counts.len(),
            profile.resource_sizes.len()
        );

        let mut with_budgets = AnalysisConfig::with_defaults(config.take())?;
        with_budgets.set_budgets(serde_json::to_value([profile])?)?;
        config = Some(with_budgets);
    }

    Ok(config)
}

/// 读取分析配置文件
async fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    info!("📁 使用配置文件: {}", path.display());
    let value = load_json_file(path).await?;
    AnalysisConfig::from_value(value)
}

/// 解析额外请求头
///
/// 以 `{` 开头视为内联 JSON，否则视为 JSON 文件路径
pub async fn resolve_extra_headers(raw: &str) -> Result<JsonValue, ConfigError> {
    let text = if raw.starts_with('{') {
        raw.to_string()
    } else {
        debug!("从文件读取额外请求头: {}", raw);
        read_text_file(Path::new(raw)).await?
    };

    let headers = serde_json::from_str(&text)?;
    Ok(headers)
}
