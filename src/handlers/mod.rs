//! HTTP handlers

pub mod auth;
pub mod comment;
pub mod health;
pub mod post;

use crate::error::AppError;
use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has passed `validator` checks
///
/// An unreadable body is a `BadRequest`; field violations become a single
/// `Validation` error listing every failing field.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Unreadable request body");
            AppError::BadRequest("Malformed request body".to_string())
        })?;

        value.validate().map_err(|e| AppError::validation(&e))?;

        Ok(Self(value))
    }
}

/// Path parameters whose parse failures answer with the standard error body
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    tracing::debug!(error = %rejection, "Unparsable path parameter");
                    AppError::BadRequest("Invalid path parameter".to_string())
                })?;

        Ok(Self(value))
    }
}
