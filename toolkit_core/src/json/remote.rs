use http::{header, StatusCode};
use serde::Serialize;

use crate::error::Result;

/// POSTs `payload` as JSON to `uri` with a fresh default client.
pub async fn push_json_to_remote<T>(uri: &str, payload: &T) -> Result<(reqwest::Response, StatusCode)>
where
    T: Serialize + ?Sized,
{
    let client = reqwest::Client::new();
    push_json_to_remote_with(&client, uri, payload).await
}

/// Same as [`push_json_to_remote`] but reuses `client`, keeping its timeouts,
/// proxies and connection pool.
///
/// Non-2xx answers are not errors; the caller inspects the returned status.
pub async fn push_json_to_remote_with<T>(
    client: &reqwest::Client,
    uri: &str,
    payload: &T,
) -> Result<(reqwest::Response, StatusCode)>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload)?;

    let response = client
        .post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    tracing::debug!(uri, status = status.as_u16(), "pushed JSON to remote");

    Ok((response, status))
}
