//! Authorization service
//!
//! Bridges plaintext credentials, which only exist at the request boundary and
//! at registration, to the digest-based store operations.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info};

use crate::domain::api_key::{
    ApiKey, ApiKeyId, KeyStore, Owner, Permission, PermissionName, PermissionRef,
};
use crate::domain::DomainError;

use super::generator::{digest_secret, ApiKeyGenerator};

/// Result of registering a new API key
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    pub id: ApiKeyId,
    pub owner: Owner,
    /// The plaintext key (only returned once)
    pub plaintext: SecretString,
}

/// Service for key registration, permission management and checks
pub struct AuthorizationService {
    store: Arc<dyn KeyStore>,
    generator: ApiKeyGenerator,
}

impl std::fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationService")
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

impl AuthorizationService {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            store,
            generator: ApiKeyGenerator::new(),
        }
    }

    /// Issue a new key for `owner`. Only the digest is persisted.
    pub async fn register_key(&self, owner: &Owner) -> Result<IssuedApiKey, DomainError> {
        let generated = self.generator.generate()?;
        let id = self.store.add_key(&generated.digest, owner).await?;

        info!(key_id = %id, owner = %owner, "API key registered");

        Ok(IssuedApiKey {
            id,
            owner: owner.clone(),
            plaintext: generated.plaintext,
        })
    }

    /// True iff the plaintext key belongs to a non-revoked key
    pub async fn authenticate(&self, plaintext: &SecretString) -> Result<bool, DomainError> {
        self.store.validate_digest(&digest_secret(plaintext)).await
    }

    /// True iff the plaintext key belongs to a non-revoked key holding `permission`
    pub async fn check_permission(
        &self,
        plaintext: &SecretString,
        permission: &PermissionName,
    ) -> Result<bool, DomainError> {
        let allowed = self
            .store
            .has_permission(&digest_secret(plaintext), permission)
            .await?;

        debug!(permission = %permission, allowed, "Permission checked");

        Ok(allowed)
    }

    /// Create a permission; existing names are left untouched
    pub async fn create_permission(&self, name: &PermissionName) -> Result<(), DomainError> {
        self.store.create_permission(name).await?;
        info!(permission = %name, "Permission ensured");
        Ok(())
    }

    /// Grant a permission, by name or id, to a key
    pub async fn grant_permission(
        &self,
        key_id: ApiKeyId,
        permission: &PermissionRef,
    ) -> Result<(), DomainError> {
        let name = match permission {
            PermissionRef::Name(name) => name.clone(),
            PermissionRef::Id(id) => self
                .store
                .get_permission(*id)
                .await?
                .map(|p| p.name().clone())
                .ok_or_else(|| DomainError::not_found(format!("Permission '{}' not found", id)))?,
        };

        self.store.grant_permission(key_id, &name).await?;
        info!(key_id = %key_id, permission = %name, "Permission granted");
        Ok(())
    }

    /// Revoke a key; it can no longer authenticate or be authorized
    pub async fn revoke_key(&self, key_id: ApiKeyId) -> Result<(), DomainError> {
        self.store.revoke_key(key_id).await?;
        info!(key_id = %key_id, "API key revoked");
        Ok(())
    }

    /// List all keys (digests only)
    pub async fn list_keys(&self) -> Result<Vec<ApiKey>, DomainError> {
        self.store.list_keys().await
    }

    /// List all permissions
    pub async fn list_permissions(&self) -> Result<Vec<Permission>, DomainError> {
        self.store.list_permissions().await
    }

    pub async fn health_check(&self) -> Result<bool, DomainError> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{MockKeyStore, PermissionId};
    use crate::infrastructure::api_key::generator::digest_key;
    use crate::infrastructure::api_key::SqliteKeyStore;
    use crate::infrastructure::storage::memory_pool;
    use mockall::predicate::eq;
    use secrecy::ExposeSecret;

    async fn create_service() -> AuthorizationService {
        let store = SqliteKeyStore::new(memory_pool().await.unwrap());
        store.initialize_schema().await.unwrap();
        AuthorizationService::new(Arc::new(store))
    }

    fn perm(name: &str) -> PermissionName {
        PermissionName::new(name).unwrap()
    }

    fn secret(plaintext: &str) -> SecretString {
        SecretString::from(plaintext.to_string())
    }

    #[tokio::test]
    async fn test_register_key_returns_plaintext_once() {
        let service = create_service().await;
        let owner = Owner::new("alice").unwrap();

        let issued = service.register_key(&owner).await.unwrap();
        let keys = service.list_keys().await.unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id(), issued.id);
        assert_eq!(keys[0].owner(), "alice");
        // the stored value is the digest, never the plaintext
        assert_ne!(keys[0].digest().as_str(), issued.plaintext.expose_secret());
        assert_eq!(keys[0].digest(), &digest_key(issued.plaintext.expose_secret()));
    }

    #[tokio::test]
    async fn test_new_key_has_no_permissions() {
        let service = create_service().await;
        service.create_permission(&perm("task.create")).await.unwrap();

        let issued = service
            .register_key(&Owner::new("alice").unwrap())
            .await
            .unwrap();
        let key = &issued.plaintext;

        assert!(service.authenticate(key).await.unwrap());
        assert!(!service.check_permission(key, &perm("task.create")).await.unwrap());
        assert!(!service.check_permission(key, &perm("admin")).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_by_name_then_check() {
        let service = create_service().await;
        service.create_permission(&perm("task.create")).await.unwrap();
        service.create_permission(&perm("task.delete")).await.unwrap();
        let issued = service
            .register_key(&Owner::new("alice").unwrap())
            .await
            .unwrap();

        service
            .grant_permission(issued.id, &PermissionRef::Name(perm("task.create")))
            .await
            .unwrap();

        let key = &issued.plaintext;
        assert!(service.check_permission(key, &perm("task.create")).await.unwrap());
        assert!(!service.check_permission(key, &perm("task.delete")).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_by_id() {
        let service = create_service().await;
        service.create_permission(&perm("task.update")).await.unwrap();
        let permission_id = service.list_permissions().await.unwrap()[0].id();
        let issued = service
            .register_key(&Owner::new("bob").unwrap())
            .await
            .unwrap();

        service
            .grant_permission(issued.id, &PermissionRef::Id(permission_id))
            .await
            .unwrap();

        assert!(service
            .check_permission(&issued.plaintext, &perm("task.update"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_grant_unknown_permission_id() {
        let service = create_service().await;
        let issued = service
            .register_key(&Owner::new("bob").unwrap())
            .await
            .unwrap();

        let result = service
            .grant_permission(issued.id, &PermissionRef::Id(PermissionId::new(77)))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_revoke_blocks_authentication() {
        let service = create_service().await;
        service.create_permission(&perm("task.create")).await.unwrap();
        let issued = service
            .register_key(&Owner::new("carol").unwrap())
            .await
            .unwrap();
        service
            .grant_permission(issued.id, &PermissionRef::Name(perm("task.create")))
            .await
            .unwrap();

        service.revoke_key(issued.id).await.unwrap();

        let key = &issued.plaintext;
        assert!(!service.authenticate(key).await.unwrap());
        assert!(!service.check_permission(key, &perm("task.create")).await.unwrap());
    }

    #[tokio::test]
    async fn test_check_permission_digests_plaintext() {
        let mut store = MockKeyStore::new();
        let expected = digest_key("plain");
        store
            .expect_has_permission()
            .withf(move |digest, permission| {
                digest.as_str() == expected.as_str() && permission.as_str() == "task.create"
            })
            .times(1)
            .returning(|_, _| Ok(true));

        let service = AuthorizationService::new(Arc::new(store));
        assert!(service
            .check_permission(&secret("plain"), &perm("task.create"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockKeyStore::new();
        store
            .expect_validate_digest()
            .returning(|_| Err(DomainError::storage("database is locked")));
        store
            .expect_revoke_key()
            .with(eq(ApiKeyId::new(1)))
            .returning(|_| Err(DomainError::storage("database is locked")));

        let service = AuthorizationService::new(Arc::new(store));

        assert!(matches!(
            service.authenticate(&secret("anything")).await,
            Err(DomainError::Storage { .. })
        ));
        assert!(matches!(
            service.revoke_key(ApiKeyId::new(1)).await,
            Err(DomainError::Storage { .. })
        ));
    }
}
