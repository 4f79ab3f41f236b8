//! Redacting audit log.
//!
//! Wraps the whole request pipeline, so it sees every exit path: rate-limit
//! rejections, validation failures, timeouts and handler results alike.
//! One `audit` event is emitted per request once the response exists.

use std::borrow::Cow;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::http::client::ClientIdentity;
use crate::observability::metrics;

/// Replaces every secret path segment in logged paths.
pub const MASK: &str = "*****";

const MESSAGE_SEGMENT: &str = "/message/";

/// Non-secret description of a request, attached by handlers to their
/// response extensions and picked up here.
#[derive(Debug, Clone, Default)]
pub struct AuditSummary(pub String);

/// Mask the key and PIN of a retrieval path.
///
/// Everything after `/message/` is dropped, whatever its shape, so even
/// malformed retrieval paths never reach the log verbatim.
pub fn mask_path(path: &str) -> Cow<'_, str> {
    match path.find(MESSAGE_SEGMENT) {
        Some(idx) => {
            let prefix = &path[..idx + MESSAGE_SEGMENT.len()];
            Cow::Owned(format!("{}{}/{}", prefix, MASK, MASK))
        }
        None => Cow::Borrowed(path),
    }
}

pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = mask_path(request.uri().path()).into_owned();
    let client = request
        .extensions()
        .get::<ClientIdentity>()
        .cloned()
        .unwrap_or_default();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    let summary = response
        .extensions()
        .get::<AuditSummary>()
        .map(|s| s.0.as_str())
        .unwrap_or_default();

    tracing::info!(
        target: "audit",
        method = %method,
        path = %path,
        summary = %summary,
        client_ip = %client.ip,
        user_agent = %client.user_agent,
        request_id = %request_id,
        duration_ms = elapsed.as_secs_f64() * 1000.0,
        status,
        "request"
    );
    metrics::record_request(method.as_str(), status, elapsed);

    response
}
