use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// 分类 id → 0-100 整数得分
pub type CategoryReport = BTreeMap<String, i64>;

/// 预算超标 key → 超标量
pub type BudgetsReport = BTreeMap<String, BudgetOverage>;

/// 预算超标量
///
/// 数量、大小和部分时间指标是带单位的字符串（`"3"`、`"20kb"`、`"150ms"`），
/// 另一部分时间指标是不带单位的原始数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetOverage {
    Value(Number),
    Text(String),
}

/// 返回给调用方的最终结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub category_report: CategoryReport,
    pub budgets_report: BudgetsReport,
    pub html_report: Option<String>,
    pub json_report: Option<String>,
}
