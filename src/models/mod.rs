pub mod analysis_config;
pub mod budget;
pub mod flags;
pub mod lhr;
pub mod loaders;
pub mod report;

pub use analysis_config::AnalysisConfig;
pub use budget::{normalize_resource_key, BudgetGroup, BudgetProfile, InlineBudget, ResourceBudgetEntry};
pub use flags::{AnalysisFlags, AnalyzerFlags, ReportFlags};
pub use lhr::{
    Audit, AuditDetails, Category, Lhr, RawResult, ResourceBudgetItem, RuntimeError,
    TimingBudgetItem, PERFORMANCE_BUDGET_AUDIT, TIMING_BUDGET_AUDIT,
};
pub use loaders::{load_json_file, read_text_file};
pub use report::{BudgetOverage, BudgetsReport, CategoryReport, FinalResult};
