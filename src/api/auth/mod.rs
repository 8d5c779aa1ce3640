//! Key registration endpoint

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::post,
    Router,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{authenticate, require_permission, PermissionGuard};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{DomainError, Owner, PermissionName};

/// Create the registration router. With open registration disabled the
/// route requires an admin key.
pub fn create_auth_router(state: &AppState) -> Router<AppState> {
    let router = Router::new().route("/register", post(register));

    if state.open_registration {
        return router;
    }

    let admin = PermissionGuard::new(state.auth.clone(), PermissionName::admin());
    router
        .route_layer(from_fn_with_state(admin, require_permission))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub owner: String,
}

/// The plaintext key is returned here and nowhere else
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub owner: String,
    pub api_key: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let owner = Owner::new(request.owner).map_err(DomainError::from)?;

    let issued = state.auth.register_key(&owner).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: issued.id.value(),
            owner: issued.owner.to_string(),
            api_key: issued.plaintext.expose_secret().to_string(),
        }),
    ))
}
