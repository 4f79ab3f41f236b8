//! Message creation and timing-safe retrieval handlers.

use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::http::error::ApiError;
use crate::http::middleware::{AuditSummary, MASK};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::validation::{validate_pin, validate_retrieval, NO_KEY_OR_PIN};
use crate::store::StoreError;

/// Body of `POST /v1/message`.
///
/// Field names are capitalized (`Message`, `Exp`, `Pin`);
/// lower-case spellings are accepted too.
#[derive(Deserialize)]
pub struct CreateRequest {
    #[serde(rename = "Message", alias = "message")]
    pub message: String,
    #[serde(rename = "Exp", alias = "exp")]
    pub exp: i64,
    #[serde(rename = "Pin", alias = "pin")]
    pub pin: String,
}

impl std::fmt::Debug for CreateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateRequest")
            .field("message", &MASK)
            .field("exp", &self.exp)
            .field("pin", &MASK)
            .finish()
    }
}

/// `POST /v1/message`
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "Can't bind create request");
            return body_rejection(&rejection).into_response();
        }
    };

    if request.message.is_empty() {
        return ApiError::Malformed("message is required".into()).into_response();
    }
    if request.exp <= 0 {
        return ApiError::Malformed("exp must be a positive number of seconds".into())
            .into_response();
    }
    if let Err(err) = validate_pin(&request.pin, state.capabilities.pin_size) {
        tracing::warn!(pin_len = request.pin.chars().count(), "Incorrect pin size");
        return err.into_response();
    }

    let ttl = Duration::from_secs(request.exp.unsigned_abs());
    let summary = creation_summary(ttl);

    let mut response = match state
        .store
        .create_message(ttl, &request.message, &request.pin)
        .await
    {
        Ok(created) => {
            metrics::record_message_created();
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to create message");
            ApiError::from(err).into_response()
        }
    };
    response.extensions_mut().insert(summary);
    response
}

/// Describe a creation without its message or PIN.
fn creation_summary(ttl: Duration) -> AuditSummary {
    let expires = chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .map(|at| at.format("%Y/%m/%d-%H:%M:%S").to_string())
        .unwrap_or_default();
    AuditSummary(format!(
        "msg: {MASK}, pin: {MASK}, exp: {}s {}",
        ttl.as_secs(),
        expires
    ))
}

fn body_rejection(rejection: &JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::Malformed("expected a JSON request body".into())
        }
        JsonRejection::JsonSyntaxError(_) => ApiError::Malformed("malformed JSON body".into()),
        JsonRejection::JsonDataError(_) => {
            ApiError::Malformed("Message, Exp and Pin are required".into())
        }
        _ if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        _ => ApiError::Malformed("unreadable request body".into()),
    }
}

/// The three outcome classes of a well-formed retrieval.
#[derive(Debug, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Delivered { key: String, message: String },
    BadPinAttempt(StoreError),
    Failed(StoreError),
}

impl RetrievalOutcome {
    pub fn classify(key: &str, result: Result<String, StoreError>) -> Self {
        match result {
            Ok(message) => Self::Delivered {
                key: key.to_string(),
                message,
            },
            Err(err @ StoreError::BadPinAttempt) => Self::BadPinAttempt(err),
            Err(err) => Self::Failed(err),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::BadPinAttempt(_) => "bad_pin",
            Self::Failed(_) => "failed",
        }
    }
}

impl IntoResponse for RetrievalOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Delivered { key, message } => {
                (StatusCode::OK, Json(json!({ "key": key, "message": message }))).into_response()
            }
            Self::BadPinAttempt(err) => ApiError::BadPinAttempt(err).into_response(),
            Self::Failed(err) => ApiError::Store(err).into_response(),
        }
    }
}

/// `GET /v1/message/{key}/{pin}`
///
/// Shape errors are answered at once. Everything past them, from the store
/// call to the serialized response, takes at least the latency floor.
pub async fn retrieve_message(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Response {
    let Ok(Path((key, pin))) = path else {
        tracing::warn!("Can't read get request path");
        return ApiError::Malformed(NO_KEY_OR_PIN.into()).into_response();
    };
    if let Err(err) = validate_retrieval(&key, &pin, state.capabilities.pin_size) {
        tracing::warn!("No valid key or pin in get request");
        return err.into_response();
    }

    state
        .latency_floor
        .run(async {
            let result = state.store.retrieve_message(&key, &pin).await;
            let outcome = RetrievalOutcome::classify(&key, result);
            if !matches!(outcome, RetrievalOutcome::Delivered { .. }) {
                tracing::warn!(outcome = outcome.label(), "Failed to load message");
            }
            metrics::record_retrieval(outcome.label());
            outcome.into_response()
        })
        .await
}
