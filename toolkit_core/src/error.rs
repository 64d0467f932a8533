//! Toolkit error types and their HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::files::UploadedFile;
use crate::json::response::envelope_response;

pub type Result<T> = std::result::Result<T, ToolkitError>;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("the uploaded body is too big (max: {limit} bytes)")]
    PayloadTooLarge { limit: u64 },

    #[error("the uploaded file type is not permitted: {content_type}")]
    UnsupportedFileType { content_type: String },

    #[error("invalid multipart body: {0}")]
    MalformedMultipart(String),

    #[error("file part has no usable file name")]
    MissingFileName,

    #[error("no files were uploaded")]
    NoFiles,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::MalformedMultipart(_)
            | UploadError::MissingFileName
            | UploadError::NoFiles => StatusCode::BAD_REQUEST,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            UploadError::Io(err) => {
                tracing::error!("Upload IO error: {:?}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        envelope_response(status, message)
    }
}

/// A batch that stopped at its first fatal error.
///
/// `uploaded` holds every file stored before the failure, in part order.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct UploadFailure {
    pub uploaded: Vec<UploadedFile>,
    #[source]
    pub error: UploadError,
}

impl UploadFailure {
    pub fn new(uploaded: Vec<UploadedFile>, error: UploadError) -> Self {
        Self { uploaded, error }
    }
}

impl From<UploadError> for UploadFailure {
    fn from(error: UploadError) -> Self {
        Self::new(Vec::new(), error)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("body contains badly-formed JSON (at line {line}, column {column})")]
    MalformedSyntax { line: usize, column: usize },

    #[error("body contains badly-formed JSON")]
    UnexpectedEof,

    #[error("body contains incorrect JSON type {}", mismatch_location(.field, .line, .column))]
    TypeMismatch {
        field: Option<String>,
        line: usize,
        column: usize,
    },

    #[error("body must not be empty")]
    EmptyBody,

    #[error("body contains unknown key {0:?}")]
    UnknownField(String),

    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("body must only contain a single JSON value")]
    MultipleValues,

    #[error("invalid JSON decode target: {0}")]
    InvalidTarget(String),

    #[error("{0}")]
    Unclassified(String),
}

fn mismatch_location(field: &Option<String>, line: &usize, column: &usize) -> String {
    match field {
        Some(field) => format!("for field {:?}", field),
        None => format!("(at line {}, column {})", line, column),
    }
}

impl JsonError {
    pub fn status(&self) -> StatusCode {
        match self {
            JsonError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            JsonError::InvalidTarget(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        if let JsonError::InvalidTarget(msg) = &self {
            tracing::error!("JSON decode target error: {}", msg);
        }

        envelope_response(self.status(), self.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error("empty string not permitted")]
    EmptySlugInput,

    #[error("after removing characters, slug is zero length")]
    EmptySlug,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("remote request failed: {0}")]
    Remote(#[from] reqwest::Error),
}

impl From<UploadFailure> for ToolkitError {
    fn from(failure: UploadFailure) -> Self {
        ToolkitError::Upload(failure.error)
    }
}

impl IntoResponse for ToolkitError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ToolkitError::Upload(err) => return err.into_response(),
            ToolkitError::Json(err) => return err.into_response(),
            ToolkitError::EmptySlugInput | ToolkitError::EmptySlug => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ToolkitError::InvalidPath(_) => (StatusCode::NOT_FOUND, "File not found".to_string()),
            ToolkitError::InvalidHeader(msg) => {
                tracing::error!("Invalid header value: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ToolkitError::Io(err) => {
                tracing::error!("IO error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ToolkitError::Serialization(err) => {
                tracing::error!("JSON serialization error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ToolkitError::Remote(err) => {
                tracing::error!("Remote request error: {:?}", err);
                (StatusCode::BAD_GATEWAY, "Remote request failed".to_string())
            }
        };

        envelope_response(status, message)
    }
}
