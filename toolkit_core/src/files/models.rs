use serde::{Deserialize, Serialize};

/// One file part that passed validation and was written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub original_name: String,
    pub stored_name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Store files under a random 25-character name plus the original extension.
    /// Defaults to `true`; when `false` the original name is used verbatim.
    pub rename: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self { rename: true }
    }
}

impl UploadOptions {
    pub fn keep_names() -> Self {
        Self { rename: false }
    }
}
