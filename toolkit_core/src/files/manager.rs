use std::path::Path;

use axum::extract::Request;
use http::header;
use multer::{Constraints, Field, Multipart, SizeLimit};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;

use crate::config::ToolkitConfig;
use crate::error::{UploadError, UploadFailure};
use crate::random::random_string;
use super::models::{UploadOptions, UploadedFile};
use super::sniff::{detect_content_type, SNIFF_LEN};
use super::validation::{FileValidationConfig, FileValidator};

/// Length of the random stem given to renamed files.
pub const RENAMED_TOKEN_LEN: usize = 25;

#[derive(Debug, Clone)]
pub struct FileManager {
    upload_limit: u64,
    validator: FileValidator,
}

impl FileManager {
    pub fn new(upload_limit: u64, validator: FileValidator) -> Self {
        Self {
            upload_limit,
            validator,
        }
    }

    pub fn from_config(config: &ToolkitConfig) -> Self {
        let validator = FileValidator::new(FileValidationConfig::new(
            config.allowed_content_types.iter().cloned(),
        ));

        Self::new(config.upload_limit(), validator)
    }

    pub fn upload_limit(&self) -> u64 {
        self.upload_limit
    }

    /// Stores every file part of a multipart request under `upload_dir`, in body order.
    ///
    /// The first failing part stops the batch; files stored before it are
    /// returned inside the [`UploadFailure`].
    pub async fn upload_files(
        &self,
        request: Request,
        upload_dir: &Path,
        options: UploadOptions,
    ) -> Result<Vec<UploadedFile>, UploadFailure> {
        let mut uploaded = Vec::new();

        match self.process(request, upload_dir, options, &mut uploaded).await {
            Ok(()) => Ok(uploaded),
            Err(error) => {
                tracing::warn!(
                    stored = uploaded.len(),
                    error = %error,
                    "upload batch aborted"
                );
                Err(UploadFailure::new(uploaded, error))
            }
        }
    }

    pub async fn upload_one_file(
        &self,
        request: Request,
        upload_dir: &Path,
        options: UploadOptions,
    ) -> Result<UploadedFile, UploadFailure> {
        let files = self.upload_files(request, upload_dir, options).await?;

        files
            .into_iter()
            .next()
            .ok_or_else(|| UploadFailure::from(UploadError::NoFiles))
    }

    async fn process(
        &self,
        request: Request,
        upload_dir: &Path,
        options: UploadOptions,
        uploaded: &mut Vec<UploadedFile>,
    ) -> Result<(), UploadError> {
        if let Some(declared) = crate::declared_content_length(request.headers()) {
            if declared > self.upload_limit {
                return Err(UploadError::PayloadTooLarge {
                    limit: self.upload_limit,
                });
            }
        }

        let boundary = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| UploadError::MalformedMultipart("missing content type".to_string()))
            .and_then(|content_type| {
                multer::parse_boundary(content_type)
                    .map_err(|e| UploadError::MalformedMultipart(e.to_string()))
            })?;

        create_dir_if_not_exist(upload_dir).await?;

        let constraints =
            Constraints::new().size_limit(SizeLimit::new().whole_stream(self.upload_limit));
        let mut multipart = Multipart::with_constraints(
            request.into_body().into_data_stream(),
            boundary,
            constraints,
        );

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.multipart_error(e))?
        {
            // Parts without a file name are plain form values.
            let raw_name = match field.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            let file = self.store_field(field, &raw_name, upload_dir, options).await?;
            uploaded.push(file);
        }

        Ok(())
    }

    async fn store_field(
        &self,
        mut field: Field<'_>,
        raw_name: &str,
        upload_dir: &Path,
        options: UploadOptions,
    ) -> Result<UploadedFile, UploadError> {
        let original_name = sanitize_file_name(raw_name).ok_or(UploadError::MissingFileName)?;

        let mut head = Vec::with_capacity(SNIFF_LEN);
        let mut finished = false;
        while head.len() < SNIFF_LEN {
            match field.chunk().await.map_err(|e| self.multipart_error(e))? {
                Some(chunk) => head.extend_from_slice(&chunk),
                None => {
                    finished = true;
                    break;
                }
            }
        }

        let content_type = detect_content_type(&head);
        tracing::debug!(
            file_name = %original_name,
            content_type,
            "sniffed uploaded file"
        );

        self.validator.check(content_type)?;

        let stored_name = if options.rename {
            renamed_file_name(&original_name)
        } else {
            original_name.clone()
        };
        let destination = upload_dir.join(&stored_name);

        // Nothing was created when this fails, so nothing is cleaned up.
        let file = async_fs::File::create(&destination).await?;

        let size_bytes = match self.write_field(file, &mut field, &head, finished).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(e) = async_fs::remove_file(&destination).await {
                    tracing::error!("Failed to remove partial upload {}: {}", destination.display(), e);
                }
                return Err(err);
            }
        };

        tracing::info!(
            original_name = %original_name,
            stored_name = %stored_name,
            size_bytes,
            "stored uploaded file"
        );

        Ok(UploadedFile {
            original_name,
            stored_name,
            size_bytes,
            content_type: content_type.to_string(),
        })
    }

    /// Writes the already-sniffed `head` followed by the rest of the part.
    async fn write_field(
        &self,
        mut file: async_fs::File,
        field: &mut Field<'_>,
        head: &[u8],
        finished: bool,
    ) -> Result<u64, UploadError> {
        file.write_all(head).await?;
        let mut written = head.len() as u64;

        if !finished {
            while let Some(chunk) = field.chunk().await.map_err(|e| self.multipart_error(e))? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
        }

        file.sync_all().await?;

        Ok(written)
    }

    fn multipart_error(&self, err: multer::Error) -> UploadError {
        match err {
            multer::Error::StreamSizeExceeded { .. } => UploadError::PayloadTooLarge {
                limit: self.upload_limit,
            },
            multer::Error::StreamReadFailed(source) => {
                UploadError::Io(std::io::Error::new(std::io::ErrorKind::Other, source))
            }
            other => UploadError::MalformedMultipart(other.to_string()),
        }
    }
}

/// Creates `path` and its parents when missing. An existing directory is not an error.
pub async fn create_dir_if_not_exist(path: &Path) -> std::io::Result<()> {
    if async_fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
    {
        return Ok(());
    }

    let mut builder = async_fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder.create(path).await
}

fn renamed_file_name(original_name: &str) -> String {
    let token = random_string(RENAMED_TOKEN_LEN);

    // Suffix from the last dot, so ".env" keeps ".env" and "a.tar.gz" keeps ".gz".
    match original_name.rfind('.').map(|idx| &original_name[idx..]) {
        Some(ext) if ext.len() > 1 => format!("{}{}", token, ext),
        _ => token,
    }
}

/// Keeps only the final path segment of a client-supplied file name.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(|c| c == '/' || c == '\\').next()?.trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return None;
    }

    Some(name.to_string())
}
