//! API key request interceptors
//!
//! `authenticate` resolves the `Authorization: ApiKey.<key>` header to a live
//! key and attaches it to the request. `require_permission` then checks the
//! route's required permission for that key. Protected routes layer both, with
//! `authenticate` outermost.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::PermissionName;
use crate::infrastructure::api_key::AuthorizationService;

/// Header value prefix carrying the plaintext key
pub const API_KEY_PREFIX: &str = "ApiKey.";

/// Credential verified by `authenticate`, stored in request extensions.
/// Only the plaintext travels; the digest is recomputed where needed.
#[derive(Debug, Clone)]
pub struct AuthenticatedKey(SecretString);

/// State for `require_permission`: the service plus the route's permission
#[derive(Debug, Clone)]
pub struct PermissionGuard {
    auth: Arc<AuthorizationService>,
    permission: PermissionName,
}

impl PermissionGuard {
    pub fn new(auth: Arc<AuthorizationService>, permission: PermissionName) -> Self {
        Self { auth, permission }
    }
}

/// Identity stage
///
/// Missing or malformed headers are rejected before the store is touched.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let plaintext = extract_api_key(request.headers())?;

    let valid = state.auth.authenticate(&plaintext).await?;

    if !valid {
        warn!(path = %request.uri().path(), "Rejected unknown or revoked API key");
        return Err(ApiError::unauthorized("Invalid API key").with_code("invalid_api_key"));
    }

    debug!("API key authenticated");
    request.extensions_mut().insert(AuthenticatedKey(plaintext));

    Ok(next.run(request).await)
}

/// Permission stage. Fails closed if `authenticate` did not run first.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(key) = request.extensions().get::<AuthenticatedKey>() else {
        warn!(
            permission = %guard.permission,
            "Permission check reached without an authenticated key"
        );
        return Err(ApiError::forbidden("Request is not authenticated"));
    };

    let allowed = guard
        .auth
        .check_permission(&key.0, &guard.permission)
        .await?;

    if !allowed {
        warn!(permission = %guard.permission, "Permission denied");
        return Err(ApiError::forbidden(format!(
            "Missing permission '{}'",
            guard.permission
        )));
    }

    Ok(next.run(request).await)
}

fn extract_api_key(headers: &HeaderMap) -> Result<SecretString, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::unauthorized(format!(
                "API key required. Provide via 'Authorization: {}<key>' header",
                API_KEY_PREFIX
            ))
            .with_code("missing_api_key")
        })?
        .to_str()
        .map_err(|_| malformed())?;

    match value.strip_prefix(API_KEY_PREFIX) {
        Some(key) if !key.is_empty() => Ok(SecretString::from(key.to_string())),
        _ => Err(malformed()),
    }
}

fn malformed() -> ApiError {
    ApiError::unauthorized("Malformed Authorization header")
        .with_code("invalid_authorization_header")
}
