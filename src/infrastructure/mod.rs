//! 基础设施层
//!
//! 外部协作者的抽象与默认实现：分析引擎、报告渲染

pub mod analyzer;
pub mod renderer;

pub use analyzer::{Analyzer, LighthouseCli};
pub use renderer::{ReportRenderer, StandaloneRenderer};
