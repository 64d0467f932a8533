//! Strict JSON request decoding with a stable error taxonomy

use axum::{body::Body, extract::Request};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::JsonError;

/// Decodes the body of `request` into `T`.
///
/// The body is read through a reader bounded by `limit` and consumed whatever
/// the outcome. See [`decode_json`] for the decoding rules.
pub async fn read_json<T>(request: Request, limit: u64, allow_unknown_fields: bool) -> Result<T, JsonError>
where
    T: DeserializeOwned,
{
    if let Some(declared) = crate::declared_content_length(request.headers()) {
        if declared > limit {
            return Err(JsonError::BodyTooLarge { limit });
        }
    }

    let body = read_bounded_body(request.into_body(), limit).await?;

    decode_json(&body, allow_unknown_fields)
}

pub async fn read_bounded_body(body: Body, limit: u64) -> Result<Bytes, JsonError> {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| JsonError::Unclassified(format!("failed to read body: {}", e)))?;

        if (buf.len() + chunk.len()) as u64 > limit {
            tracing::warn!(limit, "JSON body exceeds configured limit");
            return Err(JsonError::BodyTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}

/// Decodes exactly one JSON value from `body`.
///
/// Object keys the target ignores fail with [`JsonError::UnknownField`] unless
/// `allow_unknown_fields` is set. Anything after the first value other than
/// whitespace fails with [`JsonError::MultipleValues`].
pub fn decode_json<T>(body: &[u8], allow_unknown_fields: bool) -> Result<T, JsonError>
where
    T: DeserializeOwned,
{
    if body.iter().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
        return Err(JsonError::EmptyBody);
    }

    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let mut unknown_field: Option<String> = None;

    let decoded = {
        let mut track_ignored = |path: serde_ignored::Path<'_>| {
            if unknown_field.is_none() {
                unknown_field = Some(path.to_string());
            }
        };
        let tracked = serde_ignored::Deserializer::new(&mut deserializer, &mut track_ignored);
        serde_path_to_error::deserialize::<_, T>(tracked)
    };

    // Keys are only reported up to a decode failure, so this one comes first in the input.
    if !allow_unknown_fields {
        if let Some(key) = unknown_field {
            return Err(JsonError::UnknownField(key));
        }
    }

    let value = decoded.map_err(classify_decode_error)?;

    deserializer.end().map_err(|_| JsonError::MultipleValues)?;

    Ok(value)
}

/// Maps a parser failure onto [`JsonError`] by its category and position.
pub fn classify_decode_error(err: serde_path_to_error::Error<serde_json::Error>) -> JsonError {
    let field = match err.path().iter().next() {
        Some(_) => Some(err.path().to_string()),
        None => None,
    };
    let inner = err.into_inner();

    match inner.classify() {
        Category::Syntax => JsonError::MalformedSyntax {
            line: inner.line(),
            column: inner.column(),
        },
        Category::Eof => JsonError::UnexpectedEof,
        Category::Data => JsonError::TypeMismatch {
            field,
            line: inner.line(),
            column: inner.column(),
        },
        Category::Io => JsonError::Unclassified(inner.to_string()),
    }
}
