//! Admin API endpoints for managing keys and permissions
//!
//! Every route here requires an authenticated key holding `admin`.

pub mod api_keys;
pub mod permissions;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use super::middleware::{authenticate, require_permission, PermissionGuard};
use super::state::AppState;
use crate::domain::PermissionName;

/// Create admin API router
pub fn create_admin_router(state: &AppState) -> Router<AppState> {
    let admin = PermissionGuard::new(state.auth.clone(), PermissionName::admin());

    Router::new()
        // API key management
        .route("/keys", get(api_keys::list_api_keys))
        .route(
            "/keys/{key_id}/permissions",
            post(api_keys::grant_permission),
        )
        .route("/keys/{key_id}/revoke", post(api_keys::revoke_api_key))
        // Permission management
        .route(
            "/permissions",
            get(permissions::list_permissions).post(permissions::create_permission),
        )
        .route_layer(from_fn_with_state(admin, require_permission))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}
