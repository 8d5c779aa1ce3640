//! API key and permission entities

use serde::{Deserialize, Serialize};

use super::validation::{validate_owner, validate_permission_name, ApiKeyValidationError};

/// Owner label of the bootstrapped administrator key
pub const ADMIN_OWNER: &str = "admin";

/// Name of the permission guarding management operations
pub const ADMIN_PERMISSION: &str = "admin";

/// Store-assigned numeric identity of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(i64);

impl ApiKeyId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ApiKeyId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned numeric identity of a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(i64);

impl PermissionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for PermissionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permission name such as `task.create`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Create a new PermissionName after validation
    pub fn new(name: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let name = name.into();
        validate_permission_name(&name)?;
        Ok(Self(name))
    }

    /// The `admin` permission
    pub fn admin() -> Self {
        Self::from_static(ADMIN_PERMISSION)
    }

    /// Built-in names known to be valid
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(validate_permission_name(name).is_ok(), "invalid permission {name}");
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PermissionName {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(name: PermissionName) -> Self {
        name.0
    }
}

impl std::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a permission by name or by numeric id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionRef {
    Id(PermissionId),
    Name(PermissionName),
}

impl From<PermissionName> for PermissionRef {
    fn from(name: PermissionName) -> Self {
        Self::Name(name)
    }
}

impl From<PermissionId> for PermissionRef {
    fn from(id: PermissionId) -> Self {
        Self::Id(id)
    }
}

/// Free-text label naming who a key was issued to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Owner(String);

impl Owner {
    /// Create a new Owner; surrounding whitespace is trimmed before validation
    pub fn new(owner: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let owner = owner.into().trim().to_string();
        validate_owner(&owner)?;
        Ok(Self(owner))
    }

    pub fn admin() -> Self {
        Self(ADMIN_OWNER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Owner {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Owner> for String {
    fn from(owner: Owner) -> Self {
        owner.0
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded SHA-256 digest of a plaintext key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyDigest(String);

impl KeyDigest {
    /// Wrap an already computed digest
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API key entity as persisted. Only the digest is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    digest: KeyDigest,
    owner: String,
    revoked: bool,
}

impl ApiKey {
    pub fn new(id: ApiKeyId, digest: KeyDigest, owner: impl Into<String>, revoked: bool) -> Self {
        Self {
            id,
            digest,
            owner: owner.into(),
            revoked,
        }
    }

    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    pub fn digest(&self) -> &KeyDigest {
        &self.digest
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Check if the key may authenticate
    pub fn is_valid(&self) -> bool {
        !self.revoked
    }
}

/// Permission entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: PermissionName,
}

impl Permission {
    pub fn new(id: PermissionId, name: PermissionName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> PermissionId {
        self.id
    }

    pub fn name(&self) -> &PermissionName {
        &self.name
    }
}
