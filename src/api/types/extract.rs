//! Extractors whose rejections use the `{"error": {...}}` envelope
//!
//! axum's own `Json` and `Path` reject with plain-text bodies; these wrap them
//! and turn every rejection into an `ApiError`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

/// JSON request body or response
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Json(value))
            .map_err(|rejection| body_error(&rejection))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

fn body_error(rejection: &JsonRejection) -> ApiError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected 'Content-Type: application/json'".to_string()
        }
        other => other.body_text(),
    };

    ApiError::new(rejection.status(), ApiErrorType::InvalidRequestError, message)
        .with_code("json_parse_error")
}

/// Typed path parameters, e.g. a numeric task or key id
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| Path(value))
            .map_err(|rejection| path_error(&rejection))
    }
}

fn path_error(rejection: &PathRejection) -> ApiError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => {
            ApiError::bad_request(format!("Invalid path parameter: {}", err.body_text()))
                .with_code("invalid_path_parameter")
        }
        // Route table and handler disagree; not the caller's fault
        other => ApiError::new(
            other.status(),
            ApiErrorType::ServerError,
            "Internal server error",
        ),
    }
}
