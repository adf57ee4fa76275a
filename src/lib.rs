//! # Lighthouse Audit
//!
//! 驱动无头浏览器对页面运行一次质量分析，并把引擎的原始结果整理成
//! 调用方可以直接使用的四个字段：分类得分、预算超标、HTML 报告、JSON 报告
//!
//! ## 架构设计
//!
//! ### ① 外部协作者（browser / infrastructure）
//! - `browser/` - `BrowserLauncher`，一次审计独占一个浏览器实例
//! - `infrastructure/` - `Analyzer`（分析引擎）、`ReportRenderer`（报告渲染）
//!
//! ### ② 业务能力层（Services）
//! - `config_assembler` - 配置文件 / 预算文件 / 内联预算 / 额外请求头
//! - `report_extractor` - 从原始结果派生四种报告
//! - `warn_writer` - 运行警告输出
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/audit_runner` - 启动浏览器、调用引擎、保证释放、校验结果
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use browser::{BrowserInstance, BrowserLauncher, ChromeLauncher};
pub use config::Config;
pub use error::{AnalysisError, AuditError, AuditResult, BrowserError, ConfigError};
pub use infrastructure::{Analyzer, LighthouseCli, ReportRenderer, StandaloneRenderer};
pub use models::{
    AnalysisConfig, AnalysisFlags, AnalyzerFlags, BudgetOverage, InlineBudget, BudgetsReport,
    CategoryReport, FinalResult, Lhr, RawResult, ReportFlags,
};
pub use orchestrator::Auditor;
pub use services::{TracingWarnSink, WarnSink, WarnWriter};
