use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tokio::fs;
use tracing::debug;

use crate::error::ConfigError;

/// 相对路径按当前工作目录解析
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// 读取 UTF-8 文本文件
pub async fn read_text_file(path: &Path) -> Result<String, ConfigError> {
    let resolved = resolve_path(path);
    debug!("读取文件: {}", resolved.display());

    fs::read_to_string(&resolved)
        .await
        .map_err(|e| ConfigError::read_failed(resolved.display().to_string(), e))
}

/// 读取并解析 JSON 文件
pub async fn load_json_file(path: &Path) -> Result<JsonValue, ConfigError> {
    let content = read_text_file(path).await?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}
