//! 报告提取服务 - 业务能力层
//!
//! 从一份已校验的 `Lhr` 中派生四种结果，全部是无副作用的纯函数

use serde_json::Value as JsonValue;

use crate::error::AnalysisError;
use crate::infrastructure::ReportRenderer;
use crate::models::{
    BudgetOverage, BudgetsReport, CategoryReport, Lhr, ReportFlags, ResourceBudgetItem,
    TimingBudgetItem, PERFORMANCE_BUDGET_AUDIT, TIMING_BUDGET_AUDIT,
};
use crate::utils::{format_number, is_truthy, js_round, truthy_number};

/// 分类得分：`round(score * 100)`
///
/// 分类 id 缺失时使用其在 `categories` 中的 key
pub fn category_report(lhr: &Lhr) -> CategoryReport {
    lhr.categories()
        .iter()
        .map(|(key, category)| {
            let id = if category.id.is_empty() {
                key.clone()
            } else {
                category.id.clone()
            };
            let score = js_round(category.score.unwrap_or(0.0) * 100.0) as i64;
            (id, score)
        })
        .collect()
}

/// 请求了报告时渲染 HTML
pub fn html_report<R: ReportRenderer>(
    lhr: &Lhr,
    flags: &ReportFlags,
    renderer: &R,
) -> Result<Option<String>, AnalysisError> {
    if !flags.wants_html() {
        return Ok(None);
    }
    renderer.render_html(lhr).map(Some)
}

/// 同时请求了报告和 JSON 报告时渲染 JSON
pub fn json_report<R: ReportRenderer>(
    lhr: &Lhr,
    flags: &ReportFlags,
    renderer: &R,
) -> Result<Option<String>, AnalysisError> {
    if !flags.wants_json() {
        return Ok(None);
    }
    renderer.render_json(lhr).map(Some)
}

/// 预算超标报告
///
/// - 资源数量：`"<type>-count"` → `"3"`
/// - 资源大小：`"<type>-size"` → `"20kb"`
/// - 时间指标：对象形式取 `value` 原值，数字形式为 `"150ms"`
///
/// 时间指标最后合并，key 冲突时覆盖资源预算
pub fn budgets_report(lhr: &Lhr) -> BudgetsReport {
    let mut report = BudgetsReport::new();

    for item in lhr.typed_audit_items::<ResourceBudgetItem>(PERFORMANCE_BUDGET_AUDIT) {
        if let Some(count) = truthy_number(item.count_over_budget.as_ref()) {
            report.insert(
                format!("{}-count", item.resource_type),
                BudgetOverage::Text(format_number(count)),
            );
        }
        if let Some(size) = truthy_number(item.size_over_budget.as_ref()) {
            report.insert(
                format!("{}-size", item.resource_type),
                BudgetOverage::Text(format!("{}kb", format_number(js_round(size / 1024.0)))),
            );
        }
    }

    for item in lhr.typed_audit_items::<TimingBudgetItem>(TIMING_BUDGET_AUDIT) {
        match item.over_budget {
            Some(JsonValue::Object(ref over)) => {
                if let Some(value @ JsonValue::Number(number)) = over.get("value") {
                    if is_truthy(value) {
                        report.insert(item.metric, BudgetOverage::Value(number.clone()));
                    }
                }
            }
            Some(ref over @ JsonValue::Number(_)) => {
                if let Some(ms) = truthy_number(Some(over)) {
                    report.insert(item.metric, BudgetOverage::Text(format!("{}ms", format_number(ms))));
                }
            }
            _ => {}
        }
    }

    report
}
