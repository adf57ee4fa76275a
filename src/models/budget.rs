//! 资源预算模型
//!
//! 用户侧的预算写法（`counts` / `sizes` + 复数资源名）与分析引擎的
//! 预算结构（`resourceCounts` / `resourceSizes` + 单数资源类型）之间的转换

use phf::phf_map;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::ConfigError;
use crate::utils::is_truthy;

/// 用户资源名 → 引擎资源类型
///
/// 引擎自身的单数写法也视为合法输入
static RESOURCE_KEYS: phf::Map<&'static str, &'static str> = phf_map! {
    "documents" => "document",
    "fonts" => "font",
    "images" => "image",
    "medias" => "media",
    "others" => "other",
    "scripts" => "script",
    "stylesheets" => "stylesheet",
    "thirdParty" => "third-party",
    "total" => "total",
    "document" => "document",
    "font" => "font",
    "image" => "image",
    "media" => "media",
    "other" => "other",
    "script" => "script",
    "stylesheet" => "stylesheet",
    "third-party" => "third-party",
};

/// 将用户资源名转换为引擎资源类型
///
/// 无法识别的名称直接报错，不会原样透传
pub fn normalize_resource_key(key: &str) -> Result<&'static str, ConfigError> {
    RESOURCE_KEYS
        .get(key)
        .copied()
        .ok_or_else(|| ConfigError::UnknownResourceKey {
            key: key.to_string(),
        })
}

/// 用户提供的内联预算
///
/// 只识别 `counts` 和 `sizes` 两组，其他字段被忽略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineBudget {
    /// 资源数量上限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<JsonValue>,
    /// 资源大小上限（KB）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<JsonValue>,
}

impl InlineBudget {
    /// 获取某一组预算的原始值
    pub fn group(&self, group: BudgetGroup) -> Option<&JsonValue> {
        match group {
            BudgetGroup::Counts => self.counts.as_ref(),
            BudgetGroup::Sizes => self.sizes.as_ref(),
        }
    }

    /// 转换为 `{ counts, sizes }` 对象，缺失的分组不输出
    pub fn to_value(&self) -> JsonValue {
        let mut map = Map::new();
        for group in BudgetGroup::ALL {
            if let Some(value) = self.group(group) {
                map.insert(group.name().to_string(), value.clone());
            }
        }
        JsonValue::Object(map)
    }
}

/// 预算分组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetGroup {
    Counts,
    Sizes,
}

impl BudgetGroup {
    /// 所有可识别的分组
    pub const ALL: [BudgetGroup; 2] = [BudgetGroup::Counts, BudgetGroup::Sizes];

    /// 用户侧字段名
    pub fn name(self) -> &'static str {
        match self {
            BudgetGroup::Counts => "counts",
            BudgetGroup::Sizes => "sizes",
        }
    }
}

/// 单条资源预算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBudgetEntry {
    pub resource_type: String,
    pub budget: Number,
}

/// 引擎预算配置中的一个 profile
///
/// 两个列表总是存在，即使为空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProfile {
    pub resource_sizes: Vec<ResourceBudgetEntry>,
    pub resource_counts: Vec<ResourceBudgetEntry>,
}

impl BudgetProfile {
    /// 从内联预算构建
    pub fn from_inline(budget: &InlineBudget) -> Result<Self, ConfigError> {
        let mut profile = Self::default();

        for group in BudgetGroup::ALL {
            let Some(value) = budget.group(group).filter(|v| is_truthy(v)) else {
                continue;
            };
            let entries = to_budget_list(group, value)?;
            match group {
                BudgetGroup::Counts => profile.resource_counts = entries,
                BudgetGroup::Sizes => profile.resource_sizes = entries,
            }
        }

        Ok(profile)
    }
}

/// 将 `{ "scripts": 10, ... }` 转换为预算条目列表，阈值为假值的条目被丢弃
fn to_budget_list(
    group: BudgetGroup,
    value: &JsonValue,
) -> Result<Vec<ResourceBudgetEntry>, ConfigError> {
    let map = value.as_object().ok_or_else(|| {
        ConfigError::invalid_shape(format!("budget.{} 必须是对象", group.name()))
    })?;

    let mut entries = Vec::with_capacity(map.len());
    for (key, threshold) in map {
        let resource_type = normalize_resource_key(key)?;
        if !is_truthy(threshold) {
            continue;
        }
        let JsonValue::Number(budget) = threshold else {
            return Err(ConfigError::InvalidBudgetValue {
                key: format!("{}.{}", group.name(), key),
                value: threshold.to_string(),
            });
        };
        entries.push(ResourceBudgetEntry {
            resource_type: resource_type.to_string(),
            budget: budget.clone(),
        });
    }

    Ok(entries)
}
