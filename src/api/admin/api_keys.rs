//! API key management admin endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path};
use crate::domain::{ApiKey, ApiKeyId, PermissionRef};

/// API key as listed to administrators. Only the digest is exposed.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: i64,
    pub digest: String,
    pub owner: String,
    pub revoked: bool,
}

impl From<&ApiKey> for ApiKeyResponse {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id().value(),
            digest: key.digest().as_str().to_string(),
            owner: key.owner().to_string(),
            revoked: key.is_revoked(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub keys: Vec<ApiKeyResponse>,
}

/// Grant body: `{"permission": "task.create"}` or `{"permission": 3}`
#[derive(Debug, Clone, Deserialize)]
pub struct GrantPermissionRequest {
    pub permission: PermissionRef,
}

/// GET /admin/keys
pub async fn list_api_keys(
    State(state): State<AppState>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    debug!("Admin listing all API keys");

    let keys = state.auth.list_keys().await?;

    Ok(Json(ListApiKeysResponse {
        keys: keys.iter().map(ApiKeyResponse::from).collect(),
    }))
}

/// POST /admin/keys/{key_id}/permissions
pub async fn grant_permission(
    State(state): State<AppState>,
    Path(key_id): Path<i64>,
    Json(request): Json<GrantPermissionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(key_id, "Admin granting permission");

    let key_id = ApiKeyId::new(key_id);
    state
        .auth
        .grant_permission(key_id, &request.permission)
        .await?;

    Ok(Json(serde_json::json!({
        "granted": true,
        "key_id": key_id,
        "permission": request.permission,
    })))
}

/// POST /admin/keys/{key_id}/revoke
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Path(key_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(key_id, "Admin revoking API key");

    let key_id = ApiKeyId::new(key_id);
    state.auth.revoke_key(key_id).await?;

    Ok(Json(serde_json::json!({
        "revoked": true,
        "id": key_id,
    })))
}
