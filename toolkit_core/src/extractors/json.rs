//! JSON extractor running the strict decode pipeline

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::JsonError;
use crate::Toolkit;

/// Like `axum::Json`, but bounded by the toolkit's JSON limit, strict about
/// unknown keys and trailing values, and rejecting with [`JsonError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    Toolkit: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = JsonError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let toolkit = Toolkit::from_ref(state);

        toolkit.read_json(req).await.map(StrictJson)
    }
}
