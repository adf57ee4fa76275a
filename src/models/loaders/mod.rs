pub mod json_loader;

pub use json_loader::{load_json_file, read_text_file, resolve_path};
