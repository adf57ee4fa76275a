/// 日志工具模块
///
/// 提供日志初始化和审计结果输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{BudgetOverage, BudgetsReport, CategoryReport};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info 级别。
/// 重复调用是安全的
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录审计开始信息
///
/// # 参数
/// - `url`: 目标页面
/// - `report`: 是否生成 HTML 报告
/// - `json_report`: 是否生成 JSON 报告
pub fn log_audit_start(url: &str, report: bool, json_report: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始审计: {}", url);
    info!("📄 HTML 报告: {} | JSON 报告: {}", report, report && json_report);
    info!("{}", "=".repeat(60));
}

/// 打印分类得分
pub fn log_category_report(report: &CategoryReport) {
    info!("\n{}", "─".repeat(60));
    info!("📊 分类得分");
    info!("{}", "─".repeat(60));
    if report.is_empty() {
        info!("（没有分类结果）");
    }
    for (category, score) in report {
        info!("{:<20} {:>3}", category, score);
    }
}

/// 打印预算超标情况
pub fn log_budgets_report(report: &BudgetsReport) {
    info!("\n{}", "─".repeat(60));
    info!("💰 预算超标");
    info!("{}", "─".repeat(60));
    if report.is_empty() {
        info!("✓ 所有预算均未超标");
        return;
    }
    for (key, overage) in report {
        match overage {
            BudgetOverage::Text(text) => info!("⚠️ {:<20} +{}", key, text),
            BudgetOverage::Value(value) => info!("⚠️ {:<20} +{}", key, value),
        }
    }
}

/// 打印报告保存位置
pub fn log_report_saved(kind: &str, path: &str) {
    info!("💾 {} 报告已保存至: {}", kind, path);
}

/// 打印审计完成时间
pub fn log_audit_complete() {
    info!("\n{}", "=".repeat(60));
    info!(
        "✅ 审计完成 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}
