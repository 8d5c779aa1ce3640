//! API Key domain
//!
//! Types and traits for API keys, permissions and the grants linking them.

mod entity;
mod repository;
mod validation;

pub use entity::{
    ApiKey, ApiKeyId, KeyDigest, Owner, Permission, PermissionId, PermissionName, PermissionRef,
    ADMIN_OWNER, ADMIN_PERMISSION,
};
pub use repository::{KeyStore, PendingKey};
#[cfg(test)]
pub use repository::MockKeyStore;
pub use validation::{validate_owner, validate_permission_name, ApiKeyValidationError};

impl From<ApiKeyValidationError> for crate::domain::DomainError {
    fn from(err: ApiKeyValidationError) -> Self {
        crate::domain::DomainError::validation(err.to_string())
    }
}
