use thiserror::Error;

/// 审计流程错误类型
#[derive(Debug, Error)]
pub enum AuditError {
    /// 配置错误（配置文件 / 预算文件 / 额外请求头）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 分析引擎错误
    #[error("分析错误: {0}")]
    Analysis(#[from] AnalysisError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
}

/// 配置错误
///
/// 始终携带底层的读取 / 解析错误信息，不吞掉原始错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 目标 URL 为空
    #[error("目标 URL 不能为空")]
    EmptyUrl,
    /// 读取文件失败
    #[error("{path}: {message}")]
    ReadFailed { path: String, message: String },
    /// JSON 解析失败
    #[error("{message}")]
    ParseFailed { message: String },
    /// 无法识别的资源类型
    #[error("无法识别的预算资源类型: {key}")]
    UnknownResourceKey { key: String },
    /// 预算阈值不是数字
    #[error("预算 {key} 的阈值必须是数字, 实际为: {value}")]
    InvalidBudgetValue { key: String, value: String },
    /// 分析配置结构不正确
    #[error("分析配置格式不正确: {reason}")]
    InvalidConfigShape { reason: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    Env {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 分析引擎错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 引擎没有返回结果，或结果缺少 lhr
    #[error("Something went wrong when running the analysis against the given url")]
    MissingResult,
    /// 引擎报告了运行时错误
    #[error("{message}")]
    Runtime { message: String },
    /// 引擎进程执行失败
    #[error("分析引擎执行失败 (退出码: {code:?}): {stderr}")]
    EngineFailed { code: Option<i32>, stderr: String },
    /// 引擎输出无法解析
    #[error("分析引擎输出无法解析: {message}")]
    InvalidOutput { message: String },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {reason}")]
    LaunchFailed { reason: String },
    /// 无法从调试地址中获取端口
    #[error("无法从调试地址获取端口: {address}")]
    PortUnavailable { address: String },
    /// 关闭浏览器失败
    #[error("关闭浏览器失败: {reason}")]
    KillFailed { reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed {
            message: err.to_string(),
        }
    }
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    /// 创建文件读取错误
    pub fn read_failed(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ConfigError::ReadFailed {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// 创建配置结构错误
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfigShape {
            reason: reason.into(),
        }
    }
}

impl AnalysisError {
    /// 创建引擎运行时错误
    ///
    /// 引擎没有给出消息时退回到通用消息
    pub fn runtime(message: Option<&str>) -> Self {
        match message {
            Some(message) if !message.is_empty() => AnalysisError::Runtime {
                message: message.to_string(),
            },
            _ => AnalysisError::MissingResult,
        }
    }
}

impl BrowserError {
    /// 创建浏览器启动错误
    pub fn launch_failed(source: impl std::fmt::Display) -> Self {
        BrowserError::LaunchFailed {
            reason: source.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 审计结果类型
pub type AuditResult<T> = Result<T, AuditError>;
