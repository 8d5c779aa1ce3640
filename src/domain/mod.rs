//! Domain layer - entities, identifiers and store traits

pub mod api_key;
pub mod error;
pub mod task;

pub use api_key::{
    ApiKey, ApiKeyId, KeyDigest, KeyStore, Owner, Permission, PermissionId, PermissionName,
    PermissionRef,
};
pub use error::DomainError;
pub use task::{Task, TaskId, TaskRepository};
