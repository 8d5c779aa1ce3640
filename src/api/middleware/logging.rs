//! Request/response logging middleware
//!
//! Only an allow-list of headers is logged. Credential headers, and any value
//! carrying an `ApiKey.` credential, are logged as `[REDACTED]`.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

use super::auth::API_KEY_PREFIX;

const REDACTED: &str = "[REDACTED]";

const LOGGED_HEADERS: [&str; 8] = [
    "authorization",
    "content-type",
    "content-length",
    "accept",
    "user-agent",
    "x-request-id",
    "x-forwarded-for",
    "x-real-ip",
];

const CREDENTIAL_HEADERS: [&str; 5] = [
    "authorization",
    "proxy-authorization",
    "x-api-key",
    "cookie",
    "set-cookie",
];

/// Log each request and its outcome.
///
/// Spans come from `TraceLayer`; this middleware must not open its own.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = route_of(&request);
    let request_id = request_id_of(request.headers());

    info!(
        method = %method,
        route = %route,
        request_id = %request_id,
        headers = %loggable_headers(request.headers()),
        "Incoming request"
    );

    let response = next.run(request).await;

    info!(
        method = %method,
        route = %route,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        "Request completed"
    );

    response
}

/// Matched route template, so ids do not fan out log cardinality
fn route_of(request: &Request<Body>) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    }
}

fn request_id_of(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn loggable_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| LOGGED_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| format!("{}={}", name, render_value(name.as_str(), value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(name: &str, value: &HeaderValue) -> String {
    if CREDENTIAL_HEADERS.contains(&name) {
        return REDACTED.to_string();
    }

    match value.to_str() {
        Ok(text) if carries_api_key(text) => REDACTED.to_string(),
        Ok(text) => text.to_string(),
        Err(_) => "[non-utf8]".to_string(),
    }
}

fn carries_api_key(value: &str) -> bool {
    value.contains(API_KEY_PREFIX)
}
