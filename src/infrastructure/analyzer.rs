//! 分析引擎 - 基础设施层
//!
//! `Analyzer` 只暴露"对一个 URL 跑一次分析"的能力；
//! `LighthouseCli` 通过命令行驱动引擎连接到已启动的浏览器端口

use std::future::Future;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::models::{AnalysisConfig, AnalyzerFlags, Lhr, RawResult};

/// 只通过配置传递、不作为命令行参数的 key
const CONFIG_ONLY_FLAGS: &[&str] = &["budget"];

/// 分析引擎
pub trait Analyzer: Send + Sync {
    /// 对 `url` 运行一次分析
    ///
    /// 引擎没有产出结果时返回 `Ok(None)`，由调用方决定如何处理
    fn analyze(
        &self,
        url: &str,
        flags: &AnalyzerFlags,
        config: Option<&AnalysisConfig>,
    ) -> impl Future<Output = Result<Option<RawResult>, AnalysisError>> + Send;
}

/// 命令行分析引擎
#[derive(Debug, Clone)]
pub struct LighthouseCli {
    binary: PathBuf,
}

impl LighthouseCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for LighthouseCli {
    fn default() -> Self {
        Self::new("lighthouse")
    }
}

impl Analyzer for LighthouseCli {
    async fn analyze(
        &self,
        url: &str,
        flags: &AnalyzerFlags,
        config: Option<&AnalysisConfig>,
    ) -> Result<Option<RawResult>, AnalysisError> {
        let config_file = match config {
            Some(config) => Some(write_config_file(config).await?),
            None => None,
        };

        let args = build_args(url, flags, config_file.as_deref());
        info!("🔍 运行分析引擎: {} (端口: {:?})", url, flags.port());
        debug!("引擎参数: {:?}", args);

        let output = Command::new(&self.binary).args(&args).output().await;

        if let Some(path) = &config_file {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!("清理临时配置文件失败 {}: {}", path.display(), e);
            }
        }

        let output = output.map_err(|e| AnalysisError::EngineFailed {
            code: None,
            stderr: format!("{}: {}", self.binary.display(), e),
        })?;

        if !output.status.success() {
            return Err(AnalysisError::EngineFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(&output.stdout)
    }
}

/// 把合并后的参数翻译成命令行参数
///
/// - `true` → `--key`，其余标量 → `--key=value`
/// - 数组逐项展开，对象以 JSON 文本传递
pub fn build_args(url: &str, flags: &AnalyzerFlags, config_file: Option<&Path>) -> Vec<String> {
    let mut args = vec![url.to_string()];

    for (key, value) in flags.iter() {
        if CONFIG_ONLY_FLAGS.contains(&key.as_str()) {
            continue;
        }
        let name = to_kebab_case(key);
        match value {
            JsonValue::Null => {}
            JsonValue::Bool(true) => args.push(format!("--{}", name)),
            JsonValue::Array(items) => {
                for item in items {
                    args.push(format!("--{}={}", name, scalar_text(item)));
                }
            }
            other => args.push(format!("--{}={}", name, scalar_text(other))),
        }
    }

    if flags.get("outputPath").is_none() {
        args.push("--output-path=stdout".to_string());
    }
    if flags.get("quiet").is_none() {
        args.push("--quiet".to_string());
    }
    if let Some(path) = config_file {
        args.push(format!("--config-path={}", path.display()));
    }

    args
}

/// 解析引擎输出的 JSON
pub fn parse_output(stdout: &[u8]) -> Result<Option<RawResult>, AnalysisError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let lhr: Lhr = serde_json::from_slice(stdout).map_err(|e| AnalysisError::InvalidOutput {
        message: e.to_string(),
    })?;

    Ok(Some(RawResult { lhr: Some(lhr) }))
}

/// 字符串不加引号，其余按 JSON 文本输出
fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `extraHeaders` → `extra-headers`
fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// 将配置写入临时文件，调用结束后删除
async fn write_config_file(config: &AnalysisConfig) -> Result<PathBuf, AnalysisError> {
    let path = std::env::temp_dir().join(format!(
        "lighthouse-audit-config-{}-{}.json",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));

    let content =
        serde_json::to_vec_pretty(config).map_err(|e| AnalysisError::InvalidOutput {
            message: e.to_string(),
        })?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| AnalysisError::EngineFailed {
            code: None,
            stderr: format!("写入临时配置文件失败 {}: {}", path.display(), e),
        })?;

    debug!("临时配置文件: {}", path.display());
    Ok(path)
}
