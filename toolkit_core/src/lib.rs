//! Reusable request-handling helpers: random tokens, multipart uploads with
//! content sniffing, slugs, static downloads and strict JSON handling.

pub mod config;
pub mod error;
pub mod extractors;
pub mod files;
pub mod json;
pub mod random;
pub mod slug;

pub use config::ToolkitConfig;
pub use error::{JsonError, Result, ToolkitError, UploadError, UploadFailure};
pub use extractors::StrictJson;
pub use files::{FileManager, FileValidator, UploadOptions, UploadedFile};
pub use json::{
    error_json, error_json_with_status, push_json_to_remote, push_json_to_remote_with, write_json,
    JsonResponse,
};
pub use random::random_string;
pub use slug::slugify;

use std::{path::Path, sync::Arc};

use axum::{extract::Request, response::Response};
use http::{header, HeaderMap};
use serde::de::DeserializeOwned;

/// Entry point bundling the configuration with the helpers that depend on it.
///
/// Cheap to clone; the configuration is shared and never mutated.
#[derive(Debug, Clone)]
pub struct Toolkit {
    config: Arc<ToolkitConfig>,
    files: FileManager,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new(ToolkitConfig::default())
    }
}

impl Toolkit {
    pub fn new(config: ToolkitConfig) -> Self {
        let files = FileManager::from_config(&config);

        Self {
            config: Arc::new(config),
            files,
        }
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn files(&self) -> &FileManager {
        &self.files
    }

    pub fn random_string(&self, n: usize) -> String {
        random::random_string(n)
    }

    pub fn slugify(&self, s: &str) -> Result<String> {
        slug::slugify(s)
    }

    pub async fn upload_files(
        &self,
        request: Request,
        upload_dir: &Path,
        options: UploadOptions,
    ) -> std::result::Result<Vec<UploadedFile>, UploadFailure> {
        self.files.upload_files(request, upload_dir, options).await
    }

    pub async fn upload_one_file(
        &self,
        request: Request,
        upload_dir: &Path,
        options: UploadOptions,
    ) -> std::result::Result<UploadedFile, UploadFailure> {
        self.files.upload_one_file(request, upload_dir, options).await
    }

    pub async fn create_dir_if_not_exist(&self, path: &Path) -> Result<()> {
        files::create_dir_if_not_exist(path).await?;
        Ok(())
    }

    pub async fn download_static_file(
        &self,
        request: Request,
        dir: &Path,
        file: &str,
        display_name: &str,
    ) -> Result<Response> {
        files::download::download_static_file(request, dir, file, display_name).await
    }

    /// Decodes the request body into `T` using the configured JSON limit and
    /// unknown-field policy.
    pub async fn read_json<T>(&self, request: Request) -> std::result::Result<T, JsonError>
    where
        T: DeserializeOwned,
    {
        json::read_json(
            request,
            self.config.json_limit(),
            self.config.allow_unknown_json_fields,
        )
        .await
    }
}

/// The `Content-Length` a client declared, if present and well formed.
pub(crate) fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_declared_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_content_length(&headers), None);

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(declared_content_length(&headers), Some(42));

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(declared_content_length(&headers), None);
    }

    #[test]
    fn test_toolkit_applies_limit_fallbacks() {
        let toolkit = Toolkit::new(
            ToolkitConfig::default()
                .with_max_upload_bytes(0)
                .with_max_json_bytes(0),
        );

        assert_eq!(toolkit.files().upload_limit(), config::DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(toolkit.config().json_limit(), config::DEFAULT_MAX_JSON_BYTES);
    }

    #[tokio::test]
    async fn test_read_json_bounded_by_upload_limit() {
        let toolkit = Toolkit::new(
            ToolkitConfig::default()
                .with_max_upload_bytes(5)
                .with_max_json_bytes(0),
        );
        let request = Request::builder()
            .body(axum::body::Body::from(r#"{"foo":"bar"}"#))
            .unwrap();

        let err = toolkit.read_json::<serde_json::Value>(request).await.unwrap_err();
        assert_eq!(err, JsonError::BodyTooLarge { limit: 5 });
    }

    #[test]
    fn test_toolkit_random_string_and_slug() {
        let toolkit = Toolkit::default();

        assert_eq!(toolkit.random_string(10).len(), 10);
        assert_eq!(toolkit.slugify("Hello World").unwrap(), "hello-world");
    }
}
