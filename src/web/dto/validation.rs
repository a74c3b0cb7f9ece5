//! Body extractors that run `validator` rules before a handler sees the
//! request, and the custom rule functions shared by the request DTOs.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::auth::ValidationError;
use crate::web::error::ApiError;

/// JSON body that has passed its `validator` rules.
///
/// Unreadable bodies are a 400, rule violations a 422 with per-field details.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        check(value).map(ValidatedJson)
    }
}

/// Like [`ValidatedJson`], but an empty body stands for `T::default()`.
///
/// Used by actions whose parameters are all optional, such as locking an
/// account for the default duration.
pub struct ValidatedJsonOrDefault<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJsonOrDefault<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            T::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::bad_request(format!("Malformed JSON: {}", e)))?
        };
        check(value).map(ValidatedJsonOrDefault)
    }
}

fn check<T: Validate>(value: T) -> Result<T, ApiError> {
    value.validate().map_err(ApiError::from_validation_errors)?;
    Ok(value)
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected Content-Type: application/json")
        }
        JsonRejection::JsonSyntaxError(e) => {
            ApiError::bad_request(format!("Malformed JSON: {}", e.body_text()))
        }
        JsonRejection::JsonDataError(e) => {
            ApiError::bad_request(format!("Invalid request body: {}", e.body_text()))
        }
        other => ApiError::bad_request(other.body_text()),
    }
}

/// Rejects strings that are blank once whitespace is trimmed.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank")
            .with_message("Must contain non-whitespace characters".into()));
    }
    Ok(())
}

/// Carry an account input rule failure over to a `validator` error.
pub fn from_field_error(err: ValidationError) -> validator::ValidationError {
    validator::ValidationError::new(err.field()).with_message(err.to_string().into())
}
