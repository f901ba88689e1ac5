use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::app_error::AppError;

/// Numeric `{id}` path segment. Malformed ids become `InvalidInput` so the
/// client gets the usual JSON error body.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::InvalidInput("Invalid id".into()))?;
        Ok(Self(id))
    }
}
