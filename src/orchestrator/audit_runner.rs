//! 审计执行器 - 编排层
//!
//! ## 职责
//!
//! 对一个 URL 完成一次完整审计：
//!
//! 1. **准备配置**：解析额外请求头、组装分析配置（失败时不会启动浏览器）
//! 2. **启动浏览器**：默认参数 + 用户参数
//! 3. **运行分析**：合并 `{ port, output: "json", ...flags }` 后调用引擎，只调用一次
//! 4. **释放浏览器**：无论分析成功还是失败，都在返回前关闭浏览器
//! 5. **校验结果**：缺少结果 / 运行时错误直接失败，运行警告交给 `WarnSink`
//! 6. **提取报告**：委托 `report_extractor`
//!
//! 不做重试，结果要么完整返回，要么整体失败

use tracing::{debug, error, info};

use crate::browser::{BrowserInstance, BrowserLauncher};
use crate::error::{AnalysisError, AuditResult, ConfigError};
use crate::infrastructure::{Analyzer, ReportRenderer, StandaloneRenderer};
use crate::models::{AnalysisFlags, AnalyzerFlags, FinalResult, Lhr, RawResult, ReportFlags};
use crate::services::{
    assemble_config, budgets_report, category_report, html_report, json_report,
    resolve_extra_headers, TracingWarnSink, WarnSink,
};

/// 审计执行器
///
/// 持有四个外部协作者：浏览器启动器、分析引擎、报告渲染器、警告接收方
pub struct Auditor<L, A, R = StandaloneRenderer, W = TracingWarnSink> {
    launcher: L,
    analyzer: A,
    renderer: R,
    warn_sink: W,
}

impl<L, A, R, W> Auditor<L, A, R, W>
where
    L: BrowserLauncher,
    A: Analyzer,
    R: ReportRenderer,
    W: WarnSink,
{
    pub fn new(launcher: L, analyzer: A, renderer: R, warn_sink: W) -> Self {
        Self {
            launcher,
            analyzer,
            renderer,
            warn_sink,
        }
    }

    /// 运行一次审计并生成最终结果
    ///
    /// # 参数
    /// - `url`: 目标页面
    /// - `flags`: 报告开关
    /// - `default_browser_flags`: 默认浏览器参数，用户参数追加在其后
    /// - `analysis_flags`: 配置来源、额外请求头以及透传参数
    pub async fn run_audit(
        &self,
        url: &str,
        flags: &ReportFlags,
        default_browser_flags: &[String],
        analysis_flags: AnalysisFlags,
    ) -> AuditResult<FinalResult> {
        let browser_flags = analysis_flags.browser_flags_with_defaults(default_browser_flags);
        let lhr = self
            .launch_and_analyze(url, &browser_flags, &analysis_flags)
            .await?;

        let html_report = html_report(&lhr, flags, &self.renderer)?;
        let json_report = json_report(&lhr, flags, &self.renderer)?;

        Ok(FinalResult {
            category_report: category_report(&lhr),
            budgets_report: budgets_report(&lhr),
            html_report,
            json_report,
        })
    }

    /// 启动浏览器、运行分析并校验结果
    ///
    /// 浏览器在引擎返回（或失败）后立即关闭，且只关闭一次
    pub async fn launch_and_analyze(
        &self,
        url: &str,
        browser_flags: &[String],
        analysis_flags: &AnalysisFlags,
    ) -> AuditResult<Lhr> {
        if url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl.into());
        }

        // 空白的 extraHeaders 视为未设置
        let extra_headers = match analysis_flags
            .extra_headers
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
        {
            Some(raw) => Some(resolve_extra_headers(raw).await?),
            None => None,
        };
        let config = assemble_config(analysis_flags).await?;

        let browser = self.launcher.launch(browser_flags).await?;
        let flags = AnalyzerFlags::merge(browser.port(), analysis_flags, extra_headers);
        debug!("分析参数: {:?}", flags);

        let outcome = self.analyzer.analyze(url, &flags, config.as_ref()).await;
        let killed = browser.kill().await;

        let raw = match (outcome, killed) {
            (Ok(raw), Ok(())) => raw,
            (Ok(_), Err(kill_err)) => return Err(kill_err.into()),
            (Err(e), Ok(())) => {
                error!("❌ 分析失败: {}", e);
                return Err(e.into());
            }
            (Err(e), Err(kill_err)) => {
                error!("❌ 分析失败: {}", e);
                error!("关闭浏览器失败: {}", kill_err);
                return Err(e.into());
            }
        };

        let lhr = validate_raw_result(raw, &self.warn_sink)?;
        info!("✓ 分析完成, 共 {} 个分类", lhr.categories().len());
        Ok(lhr)
    }
}

/// 校验引擎结果
///
/// - 没有结果或缺少 `lhr` → `MissingResult`
/// - 存在 `runtimeError` → 携带引擎消息的 `Runtime`
/// - `runWarnings` 逐条交给 `warn_sink`，不影响结果
pub fn validate_raw_result<W: WarnSink + ?Sized>(
    raw: Option<RawResult>,
    warn_sink: &W,
) -> Result<Lhr, AnalysisError> {
    let lhr = raw
        .and_then(|raw| raw.lhr)
        .ok_or(AnalysisError::MissingResult)?;

    if let Some(runtime_error) = lhr.runtime_error() {
        return Err(AnalysisError::runtime(runtime_error.message.as_deref()));
    }

    for warning in lhr.run_warnings() {
        warn_sink.warn(warning);
    }

    Ok(lhr)
}
