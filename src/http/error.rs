//! JSON error responses.
//!
//! Every failure leaves the service as `{"error": "<text>"}`. Texts come
//! from fixed strings or [`StoreError`] displays, never from request
//! content.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

pub const RATE_LIMIT_MESSAGE: &str = "You have reached maximum request limit.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid fields, wrong PIN length.
    #[error("{0}")]
    Malformed(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request timed out")]
    Timeout,

    /// Key exists but the PIN did not match.
    #[error("{0}")]
    BadPinAttempt(StoreError),

    /// Any other store failure, deliberately not told apart.
    #[error("{0}")]
    Store(StoreError),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) | ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::BadPinAttempt(_) => StatusCode::EXPECTATION_FAILED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BadPinAttempt => ApiError::BadPinAttempt(err),
            other => ApiError::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Router fallback for known paths hit with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Give the bare 408 produced by the timeout layer an error body.
pub async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::Timeout.into_response();
    }
    response
}
