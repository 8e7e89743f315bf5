//! Query-string extractor with validation, the `Query` twin of `ValidatedJson`.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query extractor with automatic validation.
///
/// Used for pagination parameters:
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct Page {
///     #[serde(default)]
///     skip: u64,
///     #[validate(range(min = 1, max = 100))]
///     limit: u64,
/// }
///
/// async fn list(ValidatedQuery(page): ValidatedQuery<Page>) { /* ... */ }
/// ```
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedQuery(data))
    }
}
