use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::error::ConfigError;
use crate::models::{AnalysisFlags, InlineBudget, ReportFlags};

/// 指定 TOML 配置文件的环境变量
pub const CONFIG_FILE_ENV: &str = "AUDIT_CONFIG";

/// 程序配置文件
///
/// 加载顺序：默认值 → TOML 文件（`AUDIT_CONFIG`）→ 环境变量
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 目标URL
    pub target_url: String,
    /// 是否生成 HTML 报告
    pub report: bool,
    /// 是否生成 JSON 报告（需要同时开启 report）
    pub json_report: bool,
    /// 默认浏览器参数
    pub default_browser_flags: Vec<String>,
    /// 额外浏览器参数，逗号分隔
    pub browser_flags: Option<String>,
    /// 浏览器可执行文件
    pub chrome_executable: Option<PathBuf>,
    /// 分析引擎可执行文件
    pub lighthouse_bin: PathBuf,
    /// 分析配置 JSON 文件
    pub config_path: Option<PathBuf>,
    /// 预算 JSON 文件
    pub budget_path: Option<PathBuf>,
    /// 内联预算
    pub budget: Option<InlineBudget>,
    /// 额外请求头（内联 JSON 或文件路径）
    pub extra_headers: Option<String>,
    /// 透传给分析引擎的参数
    pub lighthouse: Map<String, JsonValue>,
    /// 报告输出目录
    pub output_dir: PathBuf,
    /// 运行警告输出文件
    pub warn_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            report: false,
            json_report: false,
            default_browser_flags: vec![
                "--disable-gpu".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            browser_flags: None,
            chrome_executable: None,
            lighthouse_bin: PathBuf::from("lighthouse"),
            config_path: None,
            budget_path: None,
            budget: None,
            extra_headers: None,
            lighthouse: Map::new(),
            output_dir: PathBuf::from("lighthouse_reports"),
            warn_file: PathBuf::from("warn.txt"),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.is_empty() => Self::from_toml_file(Path::new(&path))?,
            _ => Self::default(),
        };
        base.apply_overrides(|name| std::env::var(name).ok())
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_overrides(|name| std::env::var(name).ok())
    }

    /// 读取 TOML 配置文件
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        info!("📁 加载配置文件: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
            message: e.to_string(),
        })
    }

    /// 使用环境变量覆盖配置
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("AUDIT_URL") {
            self.target_url = v;
        }
        if let Some(v) = lookup("AUDIT_REPORT") {
            self.report = parse_bool("AUDIT_REPORT", &v)?;
        }
        if let Some(v) = lookup("AUDIT_JSON_REPORT") {
            self.json_report = parse_bool("AUDIT_JSON_REPORT", &v)?;
        }
        if let Some(v) = lookup("BROWSER_FLAGS") {
            self.browser_flags = Some(v);
        }
        if let Some(v) = lookup("CHROME_PATH") {
            self.chrome_executable = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("LIGHTHOUSE_BIN") {
            self.lighthouse_bin = PathBuf::from(v);
        }
        if let Some(v) = lookup("CONFIG_PATH") {
            self.config_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("BUDGET_PATH") {
            self.budget_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("EXTRA_HEADERS") {
            self.extra_headers = Some(v);
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("WARN_FILE") {
            self.warn_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_bool("VERBOSE_LOGGING", &v)?;
        }
        Ok(self)
    }

    pub fn report_flags(&self) -> ReportFlags {
        ReportFlags {
            report: self.report,
            json_report: self.json_report,
        }
    }

    pub fn analysis_flags(&self) -> AnalysisFlags {
        AnalysisFlags {
            browser_flags: self.browser_flags.clone(),
            config_path: self.config_path.clone(),
            budget_path: self.budget_path.clone(),
            budget: self.budget.clone(),
            extra_headers: self.extra_headers.clone(),
            passthrough: self.lighthouse.clone(),
        }
    }
}

fn parse_bool(var_name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: "bool".to_string(),
        }),
    }
}
