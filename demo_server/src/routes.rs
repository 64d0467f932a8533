//! HTTP routes exercising each toolkit operation

use std::path::PathBuf;

use axum::{
    extract::{FromRef, Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use toolkit_core::{
    write_json, JsonResponse, Result, StrictJson, Toolkit, UploadFailure, UploadOptions,
};
use tracing::info;

const MAX_TOKEN_LEN: usize = 4096;

#[derive(Clone)]
pub struct DemoState {
    pub toolkit: Toolkit,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl FromRef<DemoState> for Toolkit {
    fn from_ref(state: &DemoState) -> Self {
        state.toolkit.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub rename: Option<bool>,
}

impl UploadParams {
    fn options(&self) -> UploadOptions {
        UploadOptions {
            rename: self.rename.unwrap_or(true),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EchoPayload {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub fn create_routes() -> Router<DemoState> {
    Router::new()
        .route("/upload", post(handle_upload))
        .route("/upload/one", post(handle_upload_one))
        .route("/json", post(handle_json))
        .route("/download/:file", get(handle_download))
        .route("/token/:len", get(handle_token))
        .route("/slug/:text", get(handle_slug))
}

async fn handle_upload(
    State(state): State<DemoState>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Result<Response> {
    match state
        .toolkit
        .upload_files(request, &state.upload_dir, params.options())
        .await
    {
        Ok(files) => {
            info!("Stored {} uploaded files", files.len());
            let message = format!("{} file(s) uploaded", files.len());
            Ok(write_json(
                StatusCode::OK,
                &JsonResponse::success(message, files),
                &HeaderMap::new(),
            )?)
        }
        Err(failure) => upload_failure_response(failure),
    }
}

async fn handle_upload_one(
    State(state): State<DemoState>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Result<Response> {
    match state
        .toolkit
        .upload_one_file(request, &state.upload_dir, params.options())
        .await
    {
        Ok(file) => Ok(write_json(
            StatusCode::OK,
            &JsonResponse::success("file uploaded", file),
            &HeaderMap::new(),
        )?),
        Err(failure) => upload_failure_response(failure),
    }
}

/// Reports the failure together with the files stored before it.
fn upload_failure_response(failure: UploadFailure) -> Result<Response> {
    let status = failure.error.status();
    let message = if status.is_server_error() {
        tracing::error!("Upload failed: {:?}", failure.error);
        "Internal server error".to_string()
    } else {
        failure.error.to_string()
    };

    let payload = JsonResponse::failure(message).with_data(failure.uploaded);
    Ok(write_json(status, &payload, &HeaderMap::new())?)
}

async fn handle_json(StrictJson(payload): StrictJson<EchoPayload>) -> Result<Response> {
    info!("Received JSON payload for {}", payload.name);

    Ok(write_json(
        StatusCode::ACCEPTED,
        &JsonResponse::success("payload received", payload),
        &HeaderMap::new(),
    )?)
}

async fn handle_download(
    State(state): State<DemoState>,
    Path(file): Path<String>,
    request: Request,
) -> Result<Response> {
    state
        .toolkit
        .download_static_file(request, &state.static_dir, &file, &file)
        .await
}

async fn handle_token(State(state): State<DemoState>, Path(len): Path<usize>) -> Result<Response> {
    if len > MAX_TOKEN_LEN {
        return Ok(toolkit_core::error_json(&format!(
            "token length must not exceed {}",
            MAX_TOKEN_LEN
        ))?);
    }

    let token = state.toolkit.random_string(len);
    Ok(write_json(
        StatusCode::OK,
        &JsonResponse::success("token generated", token),
        &HeaderMap::new(),
    )?)
}

async fn handle_slug(State(state): State<DemoState>, Path(text): Path<String>) -> Result<Response> {
    let slug = state.toolkit.slugify(&text)?;

    Ok(write_json(
        StatusCode::OK,
        &JsonResponse::success("slug created", slug),
        &HeaderMap::new(),
    )?)
}
