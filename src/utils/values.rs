//! JSON 值辅助函数
//!
//! 分析引擎的输出沿用 JS 的真值语义（0 / null / "" 视为不存在），
//! 这里集中处理这些判断，避免散落在各处

use serde_json::Value as JsonValue;

/// 判断 JSON 值是否为"真值"
///
/// - `null` / `false` / `0` / `NaN` / `""` 为假
/// - 其余（包括空数组、空对象）为真
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// 取出非零数字，其余情况返回 None
pub fn truthy_number(value: Option<&JsonValue>) -> Option<f64> {
    value
        .and_then(JsonValue::as_f64)
        .filter(|n| *n != 0.0 && !n.is_nan())
}

/// 四舍五入，.5 总是向正无穷方向进位
pub fn js_round(n: f64) -> f64 {
    (n + 0.5).floor()
}

/// 将数字格式化为不带多余小数位的字符串
///
/// `150.0` → `"150"`，`150.5` → `"150.5"`
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.is_finite() && n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}
