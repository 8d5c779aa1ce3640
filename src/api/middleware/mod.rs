//! API middleware components

pub mod auth;
pub mod logging;

pub use auth::{authenticate, require_permission, AuthenticatedKey, PermissionGuard};
pub use logging::logging_middleware;
