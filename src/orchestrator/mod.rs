//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! audit_runner (一次审计)
//!     ↓
//! services (能力层：config_assembler / report_extractor / warn_writer)
//!     ↓
//! infrastructure + browser (外部协作者：Analyzer / ReportRenderer / BrowserLauncher)
//! ```
//!
//! 只有编排层持有浏览器实例

pub mod audit_runner;

pub use audit_runner::{validate_raw_result, Auditor};
