//! Key/permission store trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{ApiKey, ApiKeyId, KeyDigest, Owner, Permission, PermissionId, PermissionName};
use crate::domain::DomainError;

/// Durable storage for keys, permissions and their grants.
///
/// Every mutating operation runs as a single statement or transaction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Create backing tables and indexes if absent
    async fn initialize_schema(&self) -> Result<(), DomainError>;

    /// Constant-cost check that the backing tables are reachable
    async fn health_check(&self) -> Result<bool, DomainError>;

    /// Insert a key digest. Fails with `Conflict` if the digest is already present.
    async fn add_key(&self, digest: &KeyDigest, owner: &Owner) -> Result<ApiKeyId, DomainError>;

    /// List all keys, digests only
    async fn list_keys(&self) -> Result<Vec<ApiKey>, DomainError>;

    /// Insert-or-ignore a permission by name
    async fn create_permission(&self, name: &PermissionName) -> Result<(), DomainError>;

    /// List all permissions
    async fn list_permissions(&self) -> Result<Vec<Permission>, DomainError>;

    /// Look up a permission by id
    async fn get_permission(&self, id: PermissionId) -> Result<Option<Permission>, DomainError>;

    /// Grant a named permission to a key; granting twice is a no-op.
    /// Fails with `NotFound` for an unknown key or permission.
    async fn grant_permission(
        &self,
        key_id: ApiKeyId,
        permission: &PermissionName,
    ) -> Result<(), DomainError>;

    /// True iff a non-revoked key with this digest holds the permission
    async fn has_permission(
        &self,
        digest: &KeyDigest,
        permission: &PermissionName,
    ) -> Result<bool, DomainError>;

    /// True iff a non-revoked key with this digest exists
    async fn validate_digest(&self, digest: &KeyDigest) -> Result<bool, DomainError>;

    /// Mark a key revoked. Fails with `NotFound` for an unknown key.
    async fn revoke_key(&self, key_id: ApiKeyId) -> Result<(), DomainError>;

    /// True iff any key (revoked or not) is registered to this owner
    async fn has_key_owned_by(&self, owner: &Owner) -> Result<bool, DomainError>;

    /// Create the permission, insert the key and grant it inside one open
    /// write transaction.
    ///
    /// Returns `None` without writing if the owner already has a key. The
    /// owner check runs under the write lock, so concurrent callers cannot
    /// both proceed. Nothing is visible until `PendingKey::commit`.
    async fn bootstrap_key(
        &self,
        digest: &KeyDigest,
        owner: &Owner,
        permission: &PermissionName,
    ) -> Result<Option<Box<dyn PendingKey>>, DomainError>;
}

/// A key written by `KeyStore::bootstrap_key` but not yet committed.
/// Dropping it rolls the key, permission and grant back.
#[async_trait]
pub trait PendingKey: Send {
    fn key_id(&self) -> ApiKeyId;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
