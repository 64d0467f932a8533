use std::path::{Component, Path};

use axum::{body::Body, extract::Request, response::Response};
use http::{header, HeaderValue};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::{Result, ToolkitError};

/// Serves `dir/file` as an attachment the browser saves under `display_name`.
///
/// Conditional and range headers on `request` are honoured by the file service.
pub async fn download_static_file(
    request: Request,
    dir: &Path,
    file: &str,
    display_name: &str,
) -> Result<Response> {
    let relative = Path::new(file);
    if file.is_empty()
        || !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
    {
        tracing::warn!(file, "refusing to serve a path outside the download directory");
        return Err(ToolkitError::InvalidPath(file.to_string()));
    }

    let disposition = format!(
        "attachment; filename=\"{}\"",
        display_name.replace('\\', "\\\\").replace('"', "\\\"")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| ToolkitError::InvalidHeader(display_name.to_string()))?;

    let path = dir.join(relative);
    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = response.map(Body::new);
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, disposition);
    }

    tracing::debug!(path = %path.display(), status = response.status().as_u16(), "served static file");

    Ok(response)
}
