pub mod logging;
pub mod values;

pub use values::{format_number, is_truthy, js_round, truthy_number};
