use mime::Mime;

use crate::error::UploadError;

#[derive(Debug, Clone, Default)]
pub struct FileValidationConfig {
    /// Empty means every sniffed type is accepted.
    pub allowed_content_types: Vec<String>,
}

impl FileValidationConfig {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_content_types: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct AllowedType {
    raw: String,
    essence: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileValidator {
    allowed: Vec<AllowedType>,
}

impl FileValidator {
    pub fn new(config: FileValidationConfig) -> Self {
        let allowed = config
            .allowed_content_types
            .into_iter()
            .map(|raw| {
                let raw = raw.trim().to_string();
                let essence = raw
                    .parse::<Mime>()
                    .ok()
                    .map(|mime| mime.essence_str().to_ascii_lowercase());
                AllowedType { raw, essence }
            })
            .collect();

        Self { allowed }
    }

    pub fn allow_all() -> Self {
        Self::new(FileValidationConfig::default())
    }

    pub fn allows_everything(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Accepts `sniffed` when the allow-list is empty or one entry matches it,
    /// ignoring case, either verbatim or by MIME essence.
    pub fn check(&self, sniffed: &str) -> Result<(), UploadError> {
        if self.allows_everything() {
            return Ok(());
        }

        let sniffed_essence = sniffed
            .parse::<Mime>()
            .ok()
            .map(|mime| mime.essence_str().to_ascii_lowercase());

        let accepted = self.allowed.iter().any(|allowed| {
            allowed.raw.eq_ignore_ascii_case(sniffed)
                || matches!(
                    (&allowed.essence, &sniffed_essence),
                    (Some(a), Some(s)) if a == s
                )
        });

        if !accepted {
            tracing::warn!(
                content_type = sniffed,
                "rejecting upload with content type outside the allow-list"
            );
            return Err(UploadError::UnsupportedFileType {
                content_type: sniffed.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_accepts_everything() {
        let validator = FileValidator::allow_all();

        assert!(validator.allows_everything());
        assert!(validator.check("image/png").is_ok());
        assert!(validator.check("application/octet-stream").is_ok());
    }

    #[test]
    fn test_check_allow_list() {
        let validator = FileValidator::new(FileValidationConfig::new(["image/jpeg", "image/png"]));

        assert!(validator.check("image/png").is_ok());
        assert!(validator.check("image/jpeg").is_ok());

        let err = validator.check("image/gif").unwrap_err();
        assert!(matches!(
            err,
            UploadError::UnsupportedFileType { ref content_type } if content_type == "image/gif"
        ));
    }

    #[test]
    fn test_check_is_case_insensitive() {
        let validator = FileValidator::new(FileValidationConfig::new(["IMAGE/PNG"]));

        assert!(validator.check("image/png").is_ok());
    }

    #[test]
    fn test_check_matches_by_essence() {
        let validator = FileValidator::new(FileValidationConfig::new(["text/plain"]));

        assert!(validator.check("text/plain; charset=utf-8").is_ok());
        assert!(validator.check("text/html; charset=utf-8").is_err());

        let exact = FileValidator::new(FileValidationConfig::new(["text/plain; charset=utf-8"]));
        assert!(exact.check("text/plain; charset=utf-8").is_ok());
    }
}
