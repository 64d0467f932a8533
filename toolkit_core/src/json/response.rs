use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

/// Envelope used for every JSON reply, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value> {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

/// Serializes `payload` as the body of a `status` response.
///
/// `headers` are merged verbatim before `Content-Type: application/json` is set.
pub fn write_json<T>(status: StatusCode, payload: &T, headers: &HeaderMap) -> Result<Response, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload)?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let response_headers = response.headers_mut();
    for (name, value) in headers {
        response_headers.append(name.clone(), value.clone());
    }
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(response)
}

/// Wraps `err` in a failed [`JsonResponse`] with status 400.
pub fn error_json<E>(err: &E) -> Result<Response, serde_json::Error>
where
    E: std::fmt::Display + ?Sized,
{
    error_json_with_status(err, StatusCode::BAD_REQUEST)
}

pub fn error_json_with_status<E>(err: &E, status: StatusCode) -> Result<Response, serde_json::Error>
where
    E: std::fmt::Display + ?Sized,
{
    let payload: JsonResponse = JsonResponse::failure(err.to_string());

    write_json(status, &payload, &HeaderMap::new())
}

/// Failure envelope used by the error types' `IntoResponse` impls.
pub(crate) fn envelope_response(status: StatusCode, message: String) -> Response {
    let payload: JsonResponse = JsonResponse::failure(message);

    match write_json(status, &payload, &HeaderMap::new()) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("Failed to serialize error envelope: {:?}", err);
            status.into_response()
        }
    }
}
