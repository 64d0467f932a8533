pub mod download;
pub mod manager;
pub mod models;
pub mod sniff;
pub mod validation;

pub use manager::{create_dir_if_not_exist, FileManager, RENAMED_TOKEN_LEN};
pub use models::{UploadOptions, UploadedFile};
pub use sniff::detect_content_type;
pub use validation::{FileValidationConfig, FileValidator};
