pub mod settings;

pub use settings::{ToolkitConfig, DEFAULT_MAX_JSON_BYTES, DEFAULT_MAX_UPLOAD_BYTES};
