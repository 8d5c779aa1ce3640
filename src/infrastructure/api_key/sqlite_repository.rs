//! SQLite key/permission store

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::api_key::{
    ApiKey, ApiKeyId, KeyDigest, KeyStore, Owner, PendingKey, Permission, PermissionId,
    PermissionName,
};
use crate::domain::DomainError;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS api_keys (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key_hash TEXT NOT NULL UNIQUE,
        owner TEXT NOT NULL,
        revoked BOOLEAN NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_api_keys_owner ON api_keys(owner)",
    r#"
    CREATE TABLE IF NOT EXISTS permissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS api_key_permissions (
        api_key_id INTEGER NOT NULL REFERENCES api_keys(id),
        permission_id INTEGER NOT NULL REFERENCES permissions(id),
        PRIMARY KEY (api_key_id, permission_id)
    )
    "#,
];

/// SQLite implementation of KeyStore
#[derive(Debug, Clone)]
pub struct SqliteKeyStore {
    pool: SqlitePool,
}

impl SqliteKeyStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    async fn initialize_schema(&self) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to init auth tables: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to init auth tables: {}", e)))
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        sqlx::query("SELECT 1 FROM api_keys LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Key store health check failed: {}", e)))?;

        Ok(true)
    }

    async fn add_key(&self, digest: &KeyDigest, owner: &Owner) -> Result<ApiKeyId, DomainError> {
        let result = sqlx::query("INSERT INTO api_keys (key_hash, owner) VALUES (?, ?)")
            .bind(digest.as_str())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_key_insert_error)?;

        Ok(ApiKeyId::new(result.last_insert_rowid()))
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query("SELECT id, key_hash, owner, revoked FROM api_keys ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn create_permission(&self, name: &PermissionName) -> Result<(), DomainError> {
        sqlx::query("INSERT OR IGNORE INTO permissions (name) VALUES (?)")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create permission: {}", e)))?;

        Ok(())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, DomainError> {
        let rows = sqlx::query("SELECT id, name FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list permissions: {}", e)))?;

        rows.iter().map(row_to_permission).collect()
    }

    async fn get_permission(&self, id: PermissionId) -> Result<Option<Permission>, DomainError> {
        let row = sqlx::query("SELECT id, name FROM permissions WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get permission: {}", e)))?;

        row.as_ref().map(row_to_permission).transpose()
    }

    async fn grant_permission(
        &self,
        key_id: ApiKeyId,
        permission: &PermissionName,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let key_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM api_keys WHERE id = ?)")
                .bind(key_id.value())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to lookup key: {}", e)))?;

        if !key_exists {
            return Err(DomainError::not_found(format!("API key '{}' not found", key_id)));
        }

        let permission_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM permissions WHERE name = ?")
                .bind(permission.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to lookup permission: {}", e))
                })?;

        let permission_id = permission_id.ok_or_else(|| {
            DomainError::not_found(format!("Permission '{}' not found", permission))
        })?;

        sqlx::query(
            "INSERT OR IGNORE INTO api_key_permissions (api_key_id, permission_id) VALUES (?, ?)",
        )
        .bind(key_id.value())
        .bind(permission_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to grant permission: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to grant permission: {}", e)))
    }

    async fn has_permission(
        &self,
        digest: &KeyDigest,
        permission: &PermissionName,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM api_keys k
                JOIN api_key_permissions kp ON k.id = kp.api_key_id
                JOIN permissions p ON kp.permission_id = p.id
                WHERE k.key_hash = ? AND p.name = ? AND k.revoked = 0
            )
            "#,
        )
        .bind(digest.as_str())
        .bind(permission.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check permission: {}", e)))
    }

    async fn validate_digest(&self, digest: &KeyDigest) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM api_keys WHERE key_hash = ? AND revoked = 0)",
        )
        .bind(digest.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check api key: {}", e)))
    }

    async fn revoke_key(&self, key_id: ApiKeyId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE api_keys SET revoked = 1 WHERE id = ?")
            .bind(key_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to revoke key: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("API key '{}' not found", key_id)));
        }

        Ok(())
    }

    async fn has_key_owned_by(&self, owner: &Owner) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM api_keys WHERE owner = ?)")
            .bind(owner.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check key owner: {}", e)))
    }

    async fn bootstrap_key(
        &self,
        digest: &KeyDigest,
        owner: &Owner,
        permission: &PermissionName,
    ) -> Result<Option<Box<dyn PendingKey>>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        // A write first, so the owner check below runs under the write lock
        sqlx::query("INSERT OR IGNORE INTO permissions (name) VALUES (?)")
            .bind(permission.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create permission: {}", e)))?;

        let owner_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM api_keys WHERE owner = ?)")
                .bind(owner.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to check key owner: {}", e)))?;

        if owner_exists {
            return Ok(None);
        }

        let key_id = sqlx::query("INSERT INTO api_keys (key_hash, owner) VALUES (?, ?)")
            .bind(digest.as_str())
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_key_insert_error)?
            .last_insert_rowid();

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO api_key_permissions (api_key_id, permission_id)
            SELECT ?, id FROM permissions WHERE name = ?
            "#,
        )
        .bind(key_id)
        .bind(permission.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to grant permission: {}", e)))?;

        Ok(Some(Box::new(SqlitePendingKey {
            tx,
            key_id: ApiKeyId::new(key_id),
        })))
    }
}

/// Open bootstrap transaction; sqlx rolls it back on drop
struct SqlitePendingKey {
    tx: Transaction<'static, Sqlite>,
    key_id: ApiKeyId,
}

#[async_trait]
impl PendingKey for SqlitePendingKey {
    fn key_id(&self) -> ApiKeyId {
        self.key_id
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let SqlitePendingKey { tx, key_id } = *self;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!("Failed to commit bootstrap key {}: {}", key_id, e))
        })
    }
}

fn map_key_insert_error(e: sqlx::Error) -> DomainError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::conflict("API key digest already registered")
        }
        _ => DomainError::storage(format!("Failed to insert api key: {}", e)),
    }
}

fn row_to_api_key(row: &SqliteRow) -> Result<ApiKey, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Failed to decode api key: {}", e));

    Ok(ApiKey::new(
        ApiKeyId::new(row.try_get("id").map_err(decode)?),
        KeyDigest::from_hex(row.try_get::<String, _>("key_hash").map_err(decode)?),
        row.try_get::<String, _>("owner").map_err(decode)?,
        row.try_get("revoked").map_err(decode)?,
    ))
}

fn row_to_permission(row: &SqliteRow) -> Result<Permission, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Failed to decode permission: {}", e)))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| DomainError::storage(format!("Failed to decode permission: {}", e)))?;

    let name = PermissionName::new(name.clone()).map_err(|_| {
        DomainError::storage(format!("Stored permission name '{}' is invalid", name))
    })?;

    Ok(Permission::new(PermissionId::new(id), name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api_key::generator::digest_key;
    use crate::infrastructure::storage::memory_pool;

    async fn create_store() -> SqliteKeyStore {
        let store = SqliteKeyStore::new(memory_pool().await.unwrap());
        store.initialize_schema().await.unwrap();
        store
    }

    fn perm(name: &str) -> PermissionName {
        PermissionName::new(name).unwrap()
    }

    fn owner(name: &str) -> Owner {
        Owner::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_schema_is_idempotent() {
        let store = create_store().await;
        store.initialize_schema().await.unwrap();
        store.initialize_schema().await.unwrap();

        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_needs_schema() {
        let bare = SqliteKeyStore::new(memory_pool().await.unwrap());
        assert!(matches!(bare.health_check().await, Err(DomainError::Storage { .. })));

        bare.initialize_schema().await.unwrap();
        assert!(bare.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_add_and_list_keys() {
        let store = create_store().await;
        let digest = digest_key("plaintext-1");

        let id = store.add_key(&digest, &owner("alice")).await.unwrap();
        let keys = store.list_keys().await.unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id(), id);
        assert_eq!(keys[0].digest(), &digest);
        assert_eq!(keys[0].owner(), "alice");
        assert!(!keys[0].is_revoked());
    }

    #[tokio::test]
    async fn test_duplicate_digest_is_conflict() {
        let store = create_store().await;
        let digest = digest_key("same");

        store.add_key(&digest, &owner("alice")).await.unwrap();
        let result = store.add_key(&digest, &owner("bob")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(store.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_permission_twice_leaves_one() {
        let store = create_store().await;

        store.create_permission(&perm("x")).await.unwrap();
        store.create_permission(&perm("x")).await.unwrap();

        let permissions = store.list_permissions().await.unwrap();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].name().as_str(), "x");
    }

    #[tokio::test]
    async fn test_get_permission_by_id() {
        let store = create_store().await;
        store.create_permission(&perm("task.create")).await.unwrap();
        let id = store.list_permissions().await.unwrap()[0].id();

        let found = store.get_permission(id).await.unwrap().unwrap();
        assert_eq!(found.name().as_str(), "task.create");

        let missing = store.get_permission(PermissionId::new(999)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_grant_and_check_permission() {
        let store = create_store().await;
        let digest = digest_key("key-a");
        let id = store.add_key(&digest, &owner("alice")).await.unwrap();
        store.create_permission(&perm("task.create")).await.unwrap();
        store.create_permission(&perm("task.delete")).await.unwrap();

        assert!(!store.has_permission(&digest, &perm("task.create")).await.unwrap());

        store.grant_permission(id, &perm("task.create")).await.unwrap();

        assert!(store.has_permission(&digest, &perm("task.create")).await.unwrap());
        assert!(!store.has_permission(&digest, &perm("task.delete")).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_twice_leaves_one_row() {
        let store = create_store().await;
        let id = store.add_key(&digest_key("k"), &owner("alice")).await.unwrap();
        store.create_permission(&perm("task.create")).await.unwrap();

        store.grant_permission(id, &perm("task.create")).await.unwrap();
        store.grant_permission(id, &perm("task.create")).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_key_permissions")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_grant_unknown_permission_is_not_found() {
        let store = create_store().await;
        let id = store.add_key(&digest_key("k"), &owner("alice")).await.unwrap();

        let result = store.grant_permission(id, &perm("missing")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_grant_unknown_key_is_not_found() {
        let store = create_store().await;
        store.create_permission(&perm("task.create")).await.unwrap();

        let result = store
            .grant_permission(ApiKeyId::new(42), &perm("task.create"))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_validate_digest() {
        let store = create_store().await;
        let digest = digest_key("valid");
        store.add_key(&digest, &owner("alice")).await.unwrap();

        assert!(store.validate_digest(&digest).await.unwrap());
        assert!(!store.validate_digest(&digest_key("other")).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoked_key_loses_identity_and_permissions() {
        let store = create_store().await;
        let digest = digest_key("revoke-me");
        let id = store.add_key(&digest, &owner("alice")).await.unwrap();
        store.create_permission(&perm("task.create")).await.unwrap();
        store.grant_permission(id, &perm("task.create")).await.unwrap();

        store.revoke_key(id).await.unwrap();

        assert!(!store.validate_digest(&digest).await.unwrap());
        assert!(!store.has_permission(&digest, &perm("task.create")).await.unwrap());
        assert!(store.list_keys().await.unwrap()[0].is_revoked());
    }

    #[tokio::test]
    async fn test_revoke_unknown_key_is_not_found() {
        let store = create_store().await;

        let result = store.revoke_key(ApiKeyId::new(5)).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_has_key_owned_by() {
        let store = create_store().await;
        assert!(!store.has_key_owned_by(&owner("admin")).await.unwrap());

        store.add_key(&digest_key("k"), &owner("admin")).await.unwrap();
        assert!(store.has_key_owned_by(&owner("admin")).await.unwrap());
        assert!(!store.has_key_owned_by(&owner("alice")).await.unwrap());
    }

    #[tokio::test]
    async fn test_bootstrap_key_grants_permission_on_commit() {
        let store = create_store().await;
        let digest = digest_key("admin-key");

        let pending = store
            .bootstrap_key(&digest, &Owner::admin(), &PermissionName::admin())
            .await
            .unwrap()
            .unwrap();
        let id = pending.key_id();
        pending.commit().await.unwrap();

        assert!(store.has_permission(&digest, &PermissionName::admin()).await.unwrap());
        assert_eq!(store.list_keys().await.unwrap()[0].id(), id);
        assert_eq!(store.list_permissions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_bootstrap_key_leaves_nothing() {
        let store = create_store().await;
        let digest = digest_key("admin-key");

        let pending = store
            .bootstrap_key(&digest, &Owner::admin(), &PermissionName::admin())
            .await
            .unwrap()
            .unwrap();
        drop(pending);

        assert!(!store.has_key_owned_by(&Owner::admin()).await.unwrap());
        assert!(!store.validate_digest(&digest).await.unwrap());
        assert!(store.list_permissions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_key_skips_existing_owner() {
        let store = create_store().await;
        store.add_key(&digest_key("first"), &Owner::admin()).await.unwrap();

        let pending = store
            .bootstrap_key(&digest_key("second"), &Owner::admin(), &PermissionName::admin())
            .await
            .unwrap();

        assert!(pending.is_none());
        assert_eq!(store.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_key_rolls_back_on_duplicate_digest() {
        let store = create_store().await;
        let digest = digest_key("taken");
        store.add_key(&digest, &owner("alice")).await.unwrap();

        let result = store
            .bootstrap_key(&digest, &Owner::admin(), &PermissionName::admin())
            .await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert!(!store.has_key_owned_by(&Owner::admin()).await.unwrap());
        // permission insert was part of the rolled back transaction
        assert!(store.list_permissions().await.unwrap().is_empty());
    }
}
