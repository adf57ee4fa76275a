//! 警告输出服务 - 业务能力层
//!
//! 只负责把引擎的运行警告交给外部，不影响审计流程

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, error, warn};

/// 运行警告的接收方
pub trait WarnSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// 通过 tracing 输出警告
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWarnSink;

impl WarnSink for TracingWarnSink {
    fn warn(&self, message: &str) {
        warn!("⚠️ WARNING: {}", message);
    }
}

/// 警告写入服务
///
/// 职责：
/// - 将引擎的运行警告追加写入 warn 文件
/// - 同时通过 tracing 输出
/// - 写入失败只记录日志，不中断审计
pub struct WarnWriter {
    warn_file_path: PathBuf,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: PathBuf::from("warn.txt"),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        let line = format!(
            "[{}] {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
        file.write_all(line.as_bytes())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WarnSink for WarnWriter {
    fn warn(&self, message: &str) {
        TracingWarnSink.warn(message);
        debug!("写入警告: {}", self.warn_file_path.display());

        if let Err(e) = self.append(message) {
            error!(
                "写入警告文件失败 ({}): {}",
                self.warn_file_path.display(),
                e
            );
        }
    }
}
