use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_MAX_JSON_BYTES: u64 = 1024 * 1024;

const DEFAULT_CONFIG_FILE: &str = "toolkit.toml";

/// Process-wide toolkit settings, read-only once a [`crate::Toolkit`] owns them.
///
/// Size ceilings of `0` mean "unset" and resolve to the defaults above.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolkitConfig {
    pub max_upload_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub max_json_bytes: u64,
    pub allow_unknown_json_fields: bool,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: Vec::new(),
            max_json_bytes: DEFAULT_MAX_JSON_BYTES,
            allow_unknown_json_fields: false,
        }
    }
}

impl ToolkitConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Layers defaults, the given TOML file (when present) and `TOOLKIT_*`
    /// environment variables, in that order.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&ToolkitConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("TOOLKIT")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("allowed_content_types"),
        );

        let config: ToolkitConfig = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for content_type in &self.allowed_content_types {
            if content_type.trim().parse::<mime::Mime>().is_err() {
                return Err(ConfigError::Message(format!(
                    "Allowed content type is not a valid MIME type: {}",
                    content_type
                )));
            }
        }

        if self.allowed_content_types.is_empty() {
            tracing::debug!("No allowed content types configured - every sniffed type is accepted");
        }

        Ok(())
    }

    pub fn upload_limit(&self) -> u64 {
        if self.max_upload_bytes == 0 {
            DEFAULT_MAX_UPLOAD_BYTES
        } else {
            self.max_upload_bytes
        }
    }

    /// JSON ceiling, falling back to the upload ceiling and then to 1 MiB.
    pub fn json_limit(&self) -> u64 {
        match (self.max_json_bytes, self.max_upload_bytes) {
            (0, 0) => DEFAULT_MAX_JSON_BYTES,
            (0, upload) => upload,
            (json, _) => json,
        }
    }

    pub fn with_allowed_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_content_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn with_max_json_bytes(mut self, limit: u64) -> Self {
        self.max_json_bytes = limit;
        self
    }

    pub fn with_unknown_json_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_json_fields = allow;
        self
    }
}
