//! Permission management admin endpoints

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{DomainError, Permission, PermissionName};

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionResponse {
    pub id: i64,
    pub name: String,
}

impl From<&Permission> for PermissionResponse {
    fn from(permission: &Permission) -> Self {
        Self {
            id: permission.id().value(),
            name: permission.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListPermissionsResponse {
    pub permissions: Vec<PermissionResponse>,
}

/// POST /admin/permissions
///
/// Creating an existing name succeeds without changes.
pub async fn create_permission(
    State(state): State<AppState>,
    Json(request): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let name = PermissionName::new(request.name).map_err(DomainError::from)?;
    debug!(permission = %name, "Admin creating permission");

    state.auth.create_permission(&name).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "name": name })),
    ))
}

/// GET /admin/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ListPermissionsResponse>, ApiError> {
    debug!("Admin listing permissions");

    let permissions = state.auth.list_permissions().await?;

    Ok(Json(ListPermissionsResponse {
        permissions: permissions.iter().map(PermissionResponse::from).collect(),
    }))
}
