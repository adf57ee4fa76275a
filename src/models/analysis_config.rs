//! 分析配置
//!
//! 对引擎配置对象只做最小约束：根节点与 `settings` 必须是对象，
//! 其余字段原样透传

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::ConfigError;

/// 没有显式配置时引擎使用的默认配置
const DEFAULT_EXTENDS: &str = "lighthouse:default";

/// 传给分析引擎的配置对象
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisConfig(Map<String, JsonValue>);

impl AnalysisConfig {
    /// 从已解析的 JSON 构建，根节点必须是对象
    pub fn from_value(value: JsonValue) -> Result<Self, ConfigError> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(ConfigError::invalid_shape(format!(
                "配置根节点必须是对象, 实际为: {}",
                other
            ))),
        }
    }

    /// 以已有配置为基础补全默认值；没有配置时合成一份默认配置
    pub fn with_defaults(existing: Option<Self>) -> Result<Self, ConfigError> {
        let mut config = existing.unwrap_or_else(|| {
            let mut map = Map::new();
            map.insert("extends".to_string(), json!(DEFAULT_EXTENDS));
            Self(map)
        });
        config.settings_mut()?;
        Ok(config)
    }

    /// 获取（必要时创建）`settings` 对象
    pub fn settings_mut(&mut self) -> Result<&mut Map<String, JsonValue>, ConfigError> {
        let settings = self
            .0
            .entry("settings")
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if settings.is_null() {
            *settings = JsonValue::Object(Map::new());
        }
        settings
            .as_object_mut()
            .ok_or_else(|| ConfigError::invalid_shape("settings 必须是对象"))
    }

    /// 覆盖 `settings.budgets`
    pub fn set_budgets(&mut self, budgets: JsonValue) -> Result<(), ConfigError> {
        self.settings_mut()?.insert("budgets".to_string(), budgets);
        Ok(())
    }

    /// 读取 `settings.budgets`
    pub fn budgets(&self) -> Option<&JsonValue> {
        self.0.get("settings")?.get("budgets")
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }
}
