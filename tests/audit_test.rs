use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lighthouse_audit::{
    AnalysisConfig, AnalysisError, AnalysisFlags, Analyzer, AnalyzerFlags, AuditError, Auditor,
    BrowserError, BrowserInstance, BrowserLauncher, BudgetOverage, ConfigError, RawResult,
    ReportFlags, StandaloneRenderer, WarnSink,
};
use serde_json::{json, Value as JsonValue};
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

// ========== 测试替身 ==========

/// 记录启动与关闭次数的浏览器
#[derive(Clone, Default)]
struct MockLauncher {
    port: u16,
    fail_launch: bool,
    fail_kill: bool,
    launches: Arc<AtomicUsize>,
    kills: Arc<AtomicUsize>,
    flags: Arc<Mutex<Vec<String>>>,
}

struct MockInstance {
    port: u16,
    fail_kill: bool,
    kills: Arc<AtomicUsize>,
}

impl BrowserInstance for MockInstance {
    fn port(&self) -> u16 {
        self.port
    }

    async fn kill(self) -> Result<(), BrowserError> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        if self.fail_kill {
            return Err(BrowserError::KillFailed {
                reason: "process already gone".to_string(),
            });
        }
        Ok(())
    }
}

impl BrowserLauncher for MockLauncher {
    type Instance = MockInstance;

    async fn launch(&self, flags: &[String]) -> Result<MockInstance, BrowserError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(BrowserError::launch_failed("no chrome installed"));
        }
        *self.flags.lock().unwrap() = flags.to_vec();
        Ok(MockInstance {
            port: self.port,
            fail_kill: self.fail_kill,
            kills: self.kills.clone(),
        })
    }
}

/// 分析引擎调用记录
struct AnalyzerCall {
    url: String,
    flags: AnalyzerFlags,
    config: Option<AnalysisConfig>,
}

/// 返回预设结果的分析引擎
#[derive(Clone)]
struct MockAnalyzer {
    response: Result<Option<JsonValue>, String>,
    calls: Arc<Mutex<Vec<AnalyzerCall>>>,
}

impl MockAnalyzer {
    fn returning(raw: JsonValue) -> Self {
        Self {
            response: Ok(Some(raw)),
            calls: Arc::default(),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Arc::default(),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Analyzer for MockAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        flags: &AnalyzerFlags,
        config: Option<&AnalysisConfig>,
    ) -> Result<Option<RawResult>, AnalysisError> {
        self.calls.lock().unwrap().push(AnalyzerCall {
            url: url.to_string(),
            flags: flags.clone(),
            config: config.cloned(),
        });

        match &self.response {
            Ok(Some(raw)) => Ok(Some(serde_json::from_value(raw.clone()).unwrap())),
            Ok(None) => Ok(None),
            Err(message) => Err(AnalysisError::EngineFailed {
                code: Some(1),
                stderr: message.clone(),
            }),
        }
    }
}

#[derive(Clone, Default)]
struct CollectingSink(Arc<Mutex<Vec<String>>>);

impl WarnSink for CollectingSink {
    fn warn(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

type TestAuditor = Auditor<MockLauncher, MockAnalyzer, StandaloneRenderer, CollectingSink>;

fn auditor(launcher: &MockLauncher, analyzer: &MockAnalyzer, sink: &CollectingSink) -> TestAuditor {
    Auditor::new(launcher.clone(), analyzer.clone(), StandaloneRenderer, sink.clone())
}

fn launcher() -> MockLauncher {
    MockLauncher {
        port: 45678,
        ..Default::default()
    }
}

fn sample_result() -> JsonValue {
    json!({
        "lhr": {
            "requestedUrl": "http://example.com/",
            "categories": {
                "performance": { "id": "performance", "title": "Performance", "score": 0.873 },
                "accessibility": { "id": "accessibility", "title": "Accessibility", "score": 1 },
                "best-practices": { "id": "best-practices", "title": "Best Practices", "score": 0.92 },
                "seo": { "id": "seo", "title": "SEO", "score": 0.9 },
                "pwa": { "id": "pwa", "title": "PWA", "score": 0.3 }
            },
            "audits": {
                "performance-budget": { "details": { "items": [
                    { "resourceType": "script", "countOverBudget": 3, "sizeOverBudget": 20480 },
                    { "resourceType": "image", "countOverBudget": 0 }
                ] } },
                "timing-budget": { "details": { "items": [
                    { "metric": "interactive", "overBudget": 150 }
                ] } }
            },
            "runWarnings": ["The page loaded too slowly to finish within the time limit."]
        }
    })
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn report_all() -> ReportFlags {
    ReportFlags {
        report: true,
        json_report: true,
    }
}

// ========== 成功路径 ==========

#[tokio::test]
async fn test_run_audit_builds_final_result() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let result = assert_ok!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &report_all(), &[], AnalysisFlags::default())
            .await
    );

    assert_eq!(result.category_report["performance"], 87);
    assert_eq!(result.category_report["accessibility"], 100);
    assert_eq!(result.category_report["best-practices"], 92);
    assert_eq!(result.category_report["seo"], 90);
    assert_eq!(result.category_report["pwa"], 30);

    assert_eq!(result.budgets_report.len(), 3);
    assert_eq!(result.budgets_report["script-count"], BudgetOverage::Text("3".to_string()));
    assert_eq!(result.budgets_report["script-size"], BudgetOverage::Text("20kb".to_string()));
    assert_eq!(result.budgets_report["interactive"], BudgetOverage::Text("150ms".to_string()));

    let html = result.html_report.unwrap();
    assert!(html.contains("<td>Performance</td><td>87</td>"));
    let json: JsonValue = serde_json::from_str(&result.json_report.unwrap()).unwrap();
    assert_eq!(json["requestedUrl"], json!("http://example.com/"));

    // 警告不影响结果，且全部转交
    assert_eq!(
        *sink.0.lock().unwrap(),
        vec!["The page loaded too slowly to finish within the time limit."]
    );
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
    assert_eq!(analyzer.call_count(), 1);
}

#[tokio::test]
async fn test_reports_are_null_unless_requested() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();
    let auditor = auditor(&launcher, &analyzer, &sink);

    let result = assert_ok!(
        auditor
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );
    assert!(result.html_report.is_none());
    assert!(result.json_report.is_none());

    let json_only = ReportFlags {
        report: false,
        json_report: true,
    };
    let result = assert_ok!(
        auditor
            .run_audit("http://example.com/", &json_only, &[], AnalysisFlags::default())
            .await
    );
    assert!(result.html_report.is_none());
    assert!(result.json_report.is_none());

    let serialized = serde_json::to_value(&result).unwrap();
    assert_eq!(serialized["htmlReport"], JsonValue::Null);
    assert_eq!(serialized["jsonReport"], JsonValue::Null);
    assert_eq!(serialized["categoryReport"]["performance"], json!(87));
}

#[tokio::test]
async fn test_flags_are_merged_for_analyzer() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let analysis_flags: AnalysisFlags = serde_json::from_value(json!({
        "browserFlags": "--window-size=412x823,--lang=de",
        "extraHeaders": "{\"Cookie\":\"session=1\"}",
        "budget": { "counts": { "scripts": 4 } },
        "onlyCategories": ["performance"]
    }))
    .unwrap();
    let defaults = vec!["--headless".to_string(), "--no-sandbox".to_string()];

    assert_ok!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("https://example.org", &ReportFlags::default(), &defaults, analysis_flags)
            .await
    );

    assert_eq!(
        *launcher.flags.lock().unwrap(),
        vec!["--headless", "--no-sandbox", "--window-size=412x823", "--lang=de"]
    );

    let calls = analyzer.calls.lock().unwrap();
    let call = &calls[0];
    assert_eq!(call.url, "https://example.org");
    assert_eq!(call.flags.port(), Some(45678));
    assert_eq!(call.flags.get("output"), Some(&json!("json")));
    assert_eq!(call.flags.get("onlyCategories"), Some(&json!(["performance"])));
    assert_eq!(call.flags.extra_headers(), Some(&json!({ "Cookie": "session=1" })));
    assert!(call.flags.get("browserFlags").is_none());

    let config = call.config.as_ref().unwrap();
    assert_eq!(
        config.budgets(),
        Some(&json!([{
            "resourceSizes": [],
            "resourceCounts": [ { "resourceType": "script", "budget": 4 } ]
        }]))
    );
}

#[tokio::test]
async fn test_no_config_inputs_pass_no_config() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    assert_ok!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(analyzer.calls.lock().unwrap()[0].config.is_none());
}

#[tokio::test]
async fn test_budget_file_overrides_inline_budget() {
    let budgets = json!([{ "resourceCounts": [ { "resourceType": "total", "budget": 20 } ] }]);
    let budget_file = temp_file(&budgets.to_string());

    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let analysis_flags = AnalysisFlags {
        budget_path: Some(budget_file.path().to_path_buf()),
        budget: Some(serde_json::from_value(json!({ "sizes": { "images": 100 } })).unwrap()),
        ..Default::default()
    };

    assert_ok!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], analysis_flags)
            .await
    );

    let calls = analyzer.calls.lock().unwrap();
    assert_eq!(calls[0].config.as_ref().unwrap().budgets(), Some(&budgets));
}

// ========== 失败路径 ==========

#[tokio::test]
async fn test_missing_lhr_fails_and_kills_browser_once() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(json!({}));
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &report_all(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Analysis(AnalysisError::MissingResult)));
    assert!(err
        .to_string()
        .contains("Something went wrong when running the analysis against the given url"));
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_absent_result_fails() {
    let launcher = launcher();
    let analyzer = MockAnalyzer {
        response: Ok(None),
        calls: Arc::default(),
    };
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Analysis(AnalysisError::MissingResult)));
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_runtime_error_surfaces_engine_message() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(json!({
        "lhr": {
            "categories": {},
            "audits": {},
            "runtimeError": { "code": "NO_FCP", "message": "The page did not paint any content." },
            "runWarnings": []
        }
    }));
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    match err {
        AuditError::Analysis(AnalysisError::Runtime { message }) => {
            assert_eq!(message, "The page did not paint any content.");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_analyzer_failure_still_kills_browser() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::failing("Chrome crashed");
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Analysis(AnalysisError::EngineFailed { .. })));
    assert!(err.to_string().contains("Chrome crashed"));
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_analyzer_error_wins_over_kill_error() {
    let launcher = MockLauncher {
        fail_kill: true,
        ..launcher()
    };
    let analyzer = MockAnalyzer::failing("Chrome crashed");
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Analysis(_)));
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_kill_failure_after_success_is_browser_error() {
    let launcher = MockLauncher {
        fail_kill: true,
        ..launcher()
    };
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Browser(BrowserError::KillFailed { .. })));
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_config_fails_before_analysis() {
    let config_file = temp_file("{ \"settings\": ");
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let analysis_flags = AnalysisFlags {
        config_path: Some(config_file.path().to_path_buf()),
        ..Default::default()
    };

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], analysis_flags)
            .await
    );

    assert!(matches!(err, AuditError::Config(ConfigError::ParseFailed { .. })));
    assert_eq!(analyzer.call_count(), 0);
    // 配置失败时不会启动浏览器，因此也不会泄漏
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_extra_headers_file_fails() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let analysis_flags = AnalysisFlags {
        extra_headers: Some("/no/such/headers.json".to_string()),
        ..Default::default()
    };

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], analysis_flags)
            .await
    );

    assert!(matches!(err, AuditError::Config(ConfigError::ReadFailed { .. })));
    assert_eq!(analyzer.call_count(), 0);
}

#[tokio::test]
async fn test_blank_extra_headers_are_skipped() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();
    let auditor = auditor(&launcher, &analyzer, &sink);

    for blank in ["", "   "] {
        let analysis_flags = AnalysisFlags {
            extra_headers: Some(blank.to_string()),
            ..Default::default()
        };
        assert_ok!(
            auditor
                .run_audit("http://example.com/", &ReportFlags::default(), &[], analysis_flags)
                .await
        );
    }

    let calls = analyzer.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.flags.extra_headers().is_none()));
}

#[tokio::test]
async fn test_empty_url_is_rejected() {
    let launcher = launcher();
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("  ", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Config(ConfigError::EmptyUrl)));
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_launch_failure_skips_analysis() {
    let launcher = MockLauncher {
        fail_launch: true,
        ..launcher()
    };
    let analyzer = MockAnalyzer::returning(sample_result());
    let sink = CollectingSink::default();

    let err = assert_err!(
        auditor(&launcher, &analyzer, &sink)
            .run_audit("http://example.com/", &ReportFlags::default(), &[], AnalysisFlags::default())
            .await
    );

    assert!(matches!(err, AuditError::Browser(BrowserError::LaunchFailed { .. })));
    assert_eq!(analyzer.call_count(), 0);
    assert_eq!(launcher.kills.load(Ordering::SeqCst), 0);
}

// ========== 真实浏览器 ==========

#[tokio::test]
#[ignore] // 需要本机安装 Chrome 和 lighthouse：cargo test -- --ignored
async fn test_real_browser_audit() {
    use lighthouse_audit::{ChromeLauncher, LighthouseCli, TracingWarnSink};

    lighthouse_audit::utils::logging::init(true);

    let auditor = Auditor::new(
        ChromeLauncher::default(),
        LighthouseCli::default(),
        StandaloneRenderer,
        TracingWarnSink,
    );

    let result = auditor
        .run_audit(
            "http://example.com/",
            &report_all(),
            &["--no-sandbox".to_string()],
            AnalysisFlags::default(),
        )
        .await
        .expect("审计失败");

    for category in ["performance", "accessibility", "best-practices", "seo"] {
        let score = result.category_report[category];
        assert!((0..=100).contains(&score), "{} = {}", category, score);
    }
    assert!(result.html_report.is_some());
    assert!(result.json_report.is_some());
}
