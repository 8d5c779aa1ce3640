use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::admin;
use super::auth;
use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::tasks;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints (no auth)
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // Key registration
        .merge(auth::create_auth_router(&state))
        // Tasks
        .merge(tasks::create_task_router(&state))
        // Admin API
        .nest("/admin", admin::create_admin_router(&state))
        // Add state and middleware
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
