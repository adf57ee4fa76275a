//! 调用方参数
//!
//! - `ReportFlags`：是否生成 HTML / JSON 报告
//! - `AnalysisFlags`：浏览器参数、配置来源、额外请求头以及透传给引擎的参数
//! - `AnalyzerFlags`：最终交给引擎的合并结果

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use super::budget::InlineBudget;

/// 报告生成开关
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFlags {
    /// 生成 HTML 报告
    #[serde(default)]
    pub report: bool,
    /// 生成 JSON 报告（需要同时开启 `report`）
    #[serde(default)]
    pub json_report: bool,
}

impl ReportFlags {
    pub fn wants_html(&self) -> bool {
        self.report
    }

    pub fn wants_json(&self) -> bool {
        self.report && self.json_report
    }
}

/// 分析参数
///
/// 除了下面几个字段，其余字段原样透传给分析引擎
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFlags {
    /// 逗号分隔的额外浏览器启动参数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_flags: Option<String>,
    /// 分析配置 JSON 文件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    /// 预算 JSON 文件（引擎原生格式）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_path: Option<PathBuf>,
    /// 内联预算，仅在没有预算文件时生效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<InlineBudget>,
    /// 内联 JSON 或 JSON 文件路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<String>,
    /// 透传参数
    #[serde(flatten)]
    pub passthrough: Map<String, JsonValue>,
}

impl AnalysisFlags {
    /// 拆分用户提供的浏览器参数，去掉空项
    pub fn custom_browser_flags(&self) -> Vec<String> {
        self.browser_flags
            .as_deref()
            .map(|flags| {
                flags
                    .split(',')
                    .map(str::trim)
                    .filter(|flag| !flag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 默认参数在前，用户参数追加在后
    pub fn browser_flags_with_defaults(&self, defaults: &[String]) -> Vec<String> {
        let mut flags = defaults.to_vec();
        flags.extend(self.custom_browser_flags());
        flags
    }
}

/// 交给分析引擎的参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyzerFlags(Map<String, JsonValue>);

impl AnalyzerFlags {
    /// 合并 `{ port, output: "json", ...flags }`
    ///
    /// 透传参数可以覆盖 `port` / `output`；`extraHeaders` 替换为解析后的对象
    pub fn merge(port: u16, flags: &AnalysisFlags, extra_headers: Option<JsonValue>) -> Self {
        let mut map = Map::new();
        map.insert("port".to_string(), json!(port));
        map.insert("output".to_string(), json!("json"));
        for (key, value) in &flags.passthrough {
            map.insert(key.clone(), value.clone());
        }
        if let Some(budget) = &flags.budget {
            map.insert("budget".to_string(), budget.to_value());
        }
        if let Some(headers) = extra_headers {
            map.insert("extraHeaders".to_string(), headers);
        }
        Self(map)
    }

    pub fn port(&self) -> Option<u16> {
        self.0
            .get("port")
            .and_then(JsonValue::as_u64)
            .and_then(|p| u16::try_from(p).ok())
    }

    pub fn extra_headers(&self) -> Option<&JsonValue> {
        self.0.get("extraHeaders")
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}
