use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lighthouse_audit::utils::logging;
use lighthouse_audit::{
    Auditor, ChromeLauncher, Config, FinalResult, LighthouseCli, StandaloneRenderer, WarnWriter,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let mut config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 命令行第一个参数可以覆盖目标 URL
    if let Some(url) = std::env::args().nth(1) {
        config.target_url = url;
    }
    if config.target_url.is_empty() {
        bail!("未指定目标 URL (参数或 AUDIT_URL)");
    }

    let report_flags = config.report_flags();
    logging::log_audit_start(&config.target_url, report_flags.report, report_flags.json_report);

    let auditor = Auditor::new(
        ChromeLauncher::new(config.chrome_executable.clone()),
        LighthouseCli::new(&config.lighthouse_bin),
        StandaloneRenderer,
        WarnWriter::with_path(&config.warn_file),
    );

    let result = auditor
        .run_audit(
            &config.target_url,
            &report_flags,
            &config.default_browser_flags,
            config.analysis_flags(),
        )
        .await?;

    logging::log_category_report(&result.category_report);
    logging::log_budgets_report(&result.budgets_report);
    write_reports(&result, &config.output_dir).await?;
    logging::log_audit_complete();

    Ok(())
}

/// 把生成的报告写入输出目录
async fn write_reports(result: &FinalResult, output_dir: &Path) -> Result<()> {
    if result.html_report.is_none() && result.json_report.is_none() {
        return Ok(());
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let reports = [
        ("HTML", "html", result.html_report.as_deref()),
        ("JSON", "json", result.json_report.as_deref()),
    ];

    for (kind, ext, content) in reports {
        let Some(content) = content else {
            continue;
        };
        let path: PathBuf = output_dir.join(format!("report-{}.{}", stamp, ext));
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入报告: {}", path.display()))?;
        logging::log_report_saved(kind, &path.display().to_string());
    }

    Ok(())
}
