//! 报告渲染 - 基础设施层

use serde_json::Value as JsonValue;

use crate::error::AnalysisError;
use crate::models::Lhr;
use crate::utils::js_round;

/// 报告渲染器
pub trait ReportRenderer {
    /// 渲染 HTML 报告
    fn render_html(&self, lhr: &Lhr) -> Result<String, AnalysisError>;
    /// 渲染 JSON 报告
    fn render_json(&self, lhr: &Lhr) -> Result<String, AnalysisError>;
}

/// 自包含的报告渲染器
///
/// HTML 报告包含分类得分表，并把完整结果嵌入到 `window.__LIGHTHOUSE_JSON__`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandaloneRenderer;

impl ReportRenderer for StandaloneRenderer {
    fn render_html(&self, lhr: &Lhr) -> Result<String, AnalysisError> {
        let json = serde_json::to_string(lhr).map_err(render_failed)?;
        // 防止结果中的 `</script>` 提前结束脚本块
        let embedded = json.replace("</", "<\\/");

        let url = lhr
            .get("finalUrl")
            .or_else(|| lhr.get("requestedUrl"))
            .and_then(JsonValue::as_str)
            .unwrap_or_default();

        let mut rows = String::new();
        for (key, category) in lhr.categories() {
            let title = category.title.as_deref().unwrap_or(key.as_str());
            let score = match category.score {
                Some(score) => format!("{}", js_round(score * 100.0) as i64),
                None => "-".to_string(),
            };
            rows.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td></tr>\n",
                escape_html(title),
                score
            ));
        }

        Ok(format!(
            r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Lighthouse Report - {url}</title>
</head>
<body>
  <h1>{url}</h1>
  <table>
    <thead><tr><th>Category</th><th>Score</th></tr></thead>
    <tbody>
{rows}    </tbody>
  </table>
  <script>window.__LIGHTHOUSE_JSON__ = {embedded};</script>
</body>
</html>
"#,
            url = escape_html(url),
            rows = rows,
            embedded = embedded,
        ))
    }

    fn render_json(&self, lhr: &Lhr) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(lhr).map_err(render_failed)
    }
}

fn render_failed(err: serde_json::Error) -> AnalysisError {
    AnalysisError::InvalidOutput {
        message: err.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
