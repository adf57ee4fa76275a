pub mod config_assembler;
pub mod report_extractor;
pub mod warn_writer;

pub use config_assembler::{assemble_config, resolve_extra_headers};
pub use report_extractor::{budgets_report, category_report, html_report, json_report};
pub use warn_writer::{TracingWarnSink, WarnSink, WarnWriter};
