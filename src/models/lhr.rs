//! 分析引擎原始输出
//!
//! `Lhr` 保留引擎返回的原始对象（字段顺序、数字写法都不变），
//! 同时解析出编排和报告提取需要的几个字段

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// 资源预算审计
pub const PERFORMANCE_BUDGET_AUDIT: &str = "performance-budget";
/// 时间预算审计
pub const TIMING_BUDGET_AUDIT: &str = "timing-budget";

/// 引擎对单个 URL 的原始结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub lhr: Option<Lhr>,
}

/// 审计结果主体
///
/// 序列化时原样输出引擎给出的对象
#[derive(Debug, Clone, Default)]
pub struct Lhr {
    raw: Map<String, JsonValue>,
    categories: Vec<(String, Category)>,
    audits: BTreeMap<String, Audit>,
    runtime_error: Option<RuntimeError>,
    run_warnings: Vec<String>,
}

/// 需要解析的字段
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LhrFields {
    #[serde(default)]
    categories: Map<String, JsonValue>,
    #[serde(default)]
    audits: BTreeMap<String, Audit>,
    #[serde(default)]
    runtime_error: Option<RuntimeError>,
    #[serde(default)]
    run_warnings: Vec<String>,
}

/// 分类得分（0-1）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// 单项审计
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub details: Option<AuditDetails>,
}

/// 审计明细
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditDetails {
    #[serde(default)]
    pub items: Option<Vec<JsonValue>>,
}

/// 引擎运行时错误
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Serialize for Lhr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Lhr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        let fields = LhrFields::deserialize(&value).map_err(D::Error::custom)?;

        let categories = fields
            .categories
            .iter()
            .map(|(key, category)| {
                Category::deserialize(category)
                    .map(|parsed| (key.clone(), parsed))
                    .map_err(D::Error::custom)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let JsonValue::Object(raw) = value else {
            return Err(D::Error::custom("lhr 必须是对象"));
        };

        Ok(Self {
            raw,
            categories,
            audits: fields.audits,
            runtime_error: fields.runtime_error,
            run_warnings: fields.run_warnings,
        })
    }
}

/// `performance-budget` 的明细行
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBudgetItem {
    pub resource_type: String,
    #[serde(default)]
    pub count_over_budget: Option<JsonValue>,
    #[serde(default)]
    pub size_over_budget: Option<JsonValue>,
}

/// `timing-budget` 的明细行
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBudgetItem {
    pub metric: String,
    #[serde(default)]
    pub over_budget: Option<JsonValue>,
}

impl Lhr {
    /// 分类，保持引擎给出的顺序
    pub fn categories(&self) -> &[(String, Category)] {
        &self.categories
    }

    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        self.runtime_error.as_ref()
    }

    pub fn run_warnings(&self) -> &[String] {
        &self.run_warnings
    }

    /// 读取原始对象中的顶层字段
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.raw.get(key)
    }

    /// 获取某项审计的明细行
    ///
    /// 审计、details、items 任一层缺失都返回空列表
    pub fn audit_items(&self, audit_id: &str) -> &[JsonValue] {
        let Some(audit) = self.audits.get(audit_id) else {
            return &[];
        };
        let Some(details) = audit.details.as_ref() else {
            return &[];
        };
        match details.items.as_deref() {
            Some(items) => items,
            None => &[],
        }
    }

    /// 将某项审计的明细行解析为指定类型，无法解析的行被跳过
    pub fn typed_audit_items<T: serde::de::DeserializeOwned>(&self, audit_id: &str) -> Vec<T> {
        self.audit_items(audit_id)
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!("跳过无法解析的 {} 明细: {}", audit_id, e);
                    None
                }
            })
            .collect()
    }
}
