use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::CinemaError;

/// JSON-тело, прошедшее `validator::Validate`.
/// Ошибки разбора и валидации отдаются как 400 `{"error": ...}`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = CinemaError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| CinemaError::payload(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| CinemaError::payload(errors.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

/// Фильтры списков из query string, с тем же форматом ошибок.
#[derive(Debug, Clone)]
pub struct Filter<T>(pub T);

impl<T, S> FromRequestParts<S> for Filter<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CinemaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| CinemaError::payload(rejection.body_text()))?;
        Ok(Filter(value))
    }
}
